//! 容器内部单元测试
