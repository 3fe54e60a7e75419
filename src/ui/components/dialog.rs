//! 다이얼로그 시스템
//!
//! 비밀번호/경로 입력, 오류·완료 안내, 단축키 도움말

mod field;
mod kind;
mod render;

pub use field::TextField;
pub use kind::{DialogKind, InputPurpose};
pub use render::Dialog;
