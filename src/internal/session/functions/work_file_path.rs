//! 工作文件命名：未完成时目标路径带 `.mwd` 后缀，完成后去掉。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::internal::session::structs::session_config::WORK_FILE_SUFFIX;

/// 路径是否已带工作文件后缀（不区分大小写）。
pub fn has_work_suffix(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WORK_FILE_SUFFIX))
}

/// 目标路径对应的工作文件路径；已带后缀时原样返回。
///
/// `movie.mp4` → `movie.mp4.mwd`
pub fn work_file_path(destination: &Path) -> PathBuf {
    if has_work_suffix(destination) {
        return destination.to_path_buf();
    }
    let mut name = OsString::from(destination.as_os_str());
    name.push(".");
    name.push(WORK_FILE_SUFFIX);
    PathBuf::from(name)
}

/// 去掉工作文件后缀得到最终路径；没有后缀时原样返回。
pub fn final_file_path(work_file: &Path) -> PathBuf {
    if has_work_suffix(work_file) {
        work_file.with_extension("")
    } else {
        work_file.to_path_buf()
    }
}
