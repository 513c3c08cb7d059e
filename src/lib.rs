/// 内部实现模块
mod internal;


/// 断点元数据：记录模型与固定 1024 字节尾部块的编解码
pub mod metadata {
    use crate::internal;
    pub use internal::metadata::functions::*;
    pub use internal::metadata::structs::*;
}

/// HTTP 访问能力：探测、分块拉取，以及可替换的传输层
pub mod http {
    use crate::internal;
    pub use internal::http::functions::*;
    pub use internal::http::structs::*;
    pub use internal::http::traits::*;
}

/// 文件存储抽象，默认基于 tokio::fs
pub mod storage {
    use crate::internal;
    pub use internal::storage::structs::*;
    pub use internal::storage::traits::*;
    pub use internal::session::structs::WorkFile;
}

/// 下载会话：可断点续传的下载状态机
pub mod session {
    use crate::internal;
    pub use internal::session::functions::*;
    pub use internal::session::structs::*;
    pub use internal::session::traits::*;
}

pub mod states {
    pub mod unlock_reactive {
        use crate::internal;
        pub use internal::states::unlock_reactive::*;
    }
}

pub use internal::session::structs::{DownloadSession, SessionError, SessionEvent};
