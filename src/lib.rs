//! 惰性序列变换库。
//!
//! 所有变换均基于统一的拉取协议：`Iterator<Item = Value>`，每次调用产出一个
//! 元素，`None` 表示永久耗尽。`None` 与合法的"假值"（`false`、`0`、空字符串）
//! 在类型上完全区分，不存在混淆。
//!
//! 单线程同步求值；同一个迭代器实例由其持有者独占，跨消费者共享属于调用方
//! 的契约违背，库内部不做防御。

mod adapter;
mod chain;
mod collect;
mod err;
mod gather;
mod source;
mod value;

pub use adapter::{
    ZipIter, cycle, distinct, drop_while, filter, filter_truthy, flat_map, limit, map, multicollect, peek, reversed,
    skip, take_while, zip,
};
pub use chain::{Chain, concat, from};
pub use collect::{
    Collector, all, all_truthy, any, any_truthy, average, collect, collect_with, count, each, join, join_wrapped,
    last, max, min, reduce, sum, table,
};
pub use err::SeqErr;
pub use gather::{batch, window};
pub use source::{Source, items, iter, keys, range, values};
pub use value::{Num, Value};

/// 整数类型
pub type Integer = i64;
/// 浮点类型
pub type Float = f64;

/// 迭代器协议类型：零参数拉取，逐个产出元素，耗尽后持续返回`None`。
pub type BoxIter = Box<dyn Iterator<Item = crate::value::Value>>;

pub type IterRes = Result<BoxIter, crate::err::SeqErr>;
pub type ChainRes = Result<crate::chain::Chain, crate::err::SeqErr>;
pub type SeqRes<T> = Result<T, crate::err::SeqErr>;
