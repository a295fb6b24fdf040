// Library surface for the quiz engine, reused by the binary and by
// headless/integration tests. Terminal rendering stays bin-only in main.rs.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod player;
pub mod pool;
pub mod question;
pub mod repository;
pub mod runtime;
pub mod score;
pub mod session;
pub mod timer;
pub mod util;
