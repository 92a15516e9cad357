//! 缓存层
//!
//! 通过插件注册表支持多种缓存后端（Moka 内存缓存 / Redis），
//! 后端在进程加载时经 `declare_object_cache_plugin!` 自注册。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明并自注册一个缓存后端插件
///
/// 插件类型需要提供 `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $plugin:ident) => {
        #[ctor::ctor]
        fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let plugin = $plugin::new()
                            .map_err($crate::errors::AttendanceError::cache_connection)?;
                        Ok(Box::new(plugin) as Box<dyn $crate::cache::ObjectCache>)
                    }) as $crate::cache::register::BoxedObjectCacheFuture
                }),
            );
        }
    };
}
