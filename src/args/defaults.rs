pub(crate) const DEFAULT_MAXOUT: &str = "64";
pub(crate) const DEFAULT_CONFIG_DIR: &str = "config";
pub(crate) const DEFAULT_COMPUTE_URL: &str = "http://127.0.0.1:9001/compute";
pub(crate) const DEFAULT_STORAGE_URL: &str = "http://127.0.0.1:9002/storage/pushdown";
