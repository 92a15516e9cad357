use async_trait::async_trait;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端暂时不可用或取值失败，调用方按未命中降级处理
    ExistsButNoValue,
}

/// 对象缓存后端的统一接口
///
/// 值统一以 JSON 字符串存取，保持 trait 对象安全。
#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;

    /// ttl 单位为秒，0 表示使用后端默认策略
    async fn insert_raw(&self, key: String, value: String, ttl: u64);

    async fn remove(&self, key: &str);

    async fn invalidate_all(&self);
}
