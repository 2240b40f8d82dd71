pub mod catalog;
pub mod classify;
pub mod erc20;
pub mod erc721;
pub mod eval;
pub mod matcher;
pub mod predicates;
