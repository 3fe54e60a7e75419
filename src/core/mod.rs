// Core - 아카이브 트리 조립/정규화와 작업 상태 머신
pub mod actions;
pub mod backend;
pub mod normalize;
pub mod session;
pub mod tree;
