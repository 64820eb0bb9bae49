//! wxpy identity cache adapter
//!
//! Reads the JSON extracted from the bridge's `wxpy.pkl` and `wxpy_puid.pkl`.

pub mod cache_files;

pub use cache_files::WxpyCacheFiles;
