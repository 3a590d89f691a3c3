//! 进程生命周期：启动准备、HTTP 服务、优雅关闭

pub mod server;
pub mod shutdown;
pub mod startup;

pub use server::run_server;
pub use startup::{StartupContext, prepare_server_startup};
