/// A macro to simplify caching logic using Redis.
///
/// Checks the cache for the given key first. On a hit, the cached value is
/// returned. On a miss, the provided block computes the value, which is then
/// stored in the cache via the background writer and returned.
///
/// # Arguments
/// * `$cache`: The cache instance. Must provide `get_from_cache` and
///   `set_in_background`.
/// * `$key`: The `CacheKey` under which the value is cached.
/// * `$ttl`: Time-to-live for the cached value in seconds.
/// * `$block`: The async block executed on a cache miss.
///
/// # Example
/// ```rust,no_run
/// let poster = cached!(cache, CacheKey::Poster(title), POSTER_CACHE_TTL, async move {
///     fetch_poster_from_tmdb(title).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
