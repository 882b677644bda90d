use crate::chain::Chain;
use crate::err::SeqErr;
use crate::value::Value;
use crate::{BoxIter, Integer, IterRes};
use rustc_hash::FxHashMap;

/// 可归一化为迭代器的输入源，归一化的唯一入口。
///
/// 封闭枚举：每种来源对应一个变体，无法枚举的标量落入`Scalar`，
/// 在归一化时以`UnsupportedSourceKind`报错。
pub enum Source {
    /// 空输入，归一化为空迭代器。
    Nil,
    /// 有序序列，按序消费。
    Seq(Vec<Value>),
    /// 文本，逐字符产出。
    Text(String),
    /// 键值映射，归一化时按任意顺序产出键，与[`keys`]一致。
    Map(FxHashMap<String, Value>),
    /// 已满足协议的迭代器，原样透传。
    Iter(BoxIter),
    /// 不可迭代的标量，归一化失败。
    Scalar(Value),
}

impl Source {
    /// 从任意可转换元素构造序列源。
    pub fn seq(items: impl IntoIterator<Item = impl Into<Value>>) -> Source {
        Source::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil => Source::Nil,
            Value::Str(text) => Source::Text(text),
            Value::List(items) => Source::Seq(items),
            Value::Map(map) => Source::Map(map),
            scalar => Source::Scalar(scalar),
        }
    }
}

impl From<Vec<Value>> for Source {
    fn from(items: Vec<Value>) -> Self {
        Source::Seq(items)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<FxHashMap<String, Value>> for Source {
    fn from(map: FxHashMap<String, Value>) -> Self {
        Source::Map(map)
    }
}

impl From<BoxIter> for Source {
    fn from(iter: BoxIter) -> Self {
        Source::Iter(iter)
    }
}

impl From<Chain> for Source {
    fn from(chain: Chain) -> Self {
        Source::Iter(Box::new(chain))
    }
}

impl<T: Into<Source>> From<Option<T>> for Source {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(src) => src.into(),
            None => Source::Nil,
        }
    }
}

/// 归一化：任意输入源转为统一的拉取迭代器。
///
/// 缺失输入（`Nil`/`None`）得到空迭代器；已经是迭代器的输入原样透传，
/// 因此重复归一化是幂等的。标量无法迭代，立即返回错误。
pub fn iter(src: impl Into<Source>) -> IterRes {
    match src.into() {
        Source::Nil => Ok(Box::new(std::iter::empty())),
        Source::Seq(items) => Ok(Box::new(items.into_iter())),
        Source::Text(text) => Ok(Box::new(OwnedChars::new(text))),
        Source::Map(map) => Ok(Box::new(map.into_keys().map(Value::Str))),
        Source::Iter(iter) => Ok(iter),
        Source::Scalar(value) => Err(SeqErr::UnsupportedSourceKind { kind: value.type_name() }),
    }
}

/// 映射的键，产出顺序未指定。
pub fn keys(map: FxHashMap<String, Value>) -> BoxIter {
    Box::new(map.into_keys().map(Value::Str))
}

/// 映射的值，产出顺序未指定。
pub fn values(map: FxHashMap<String, Value>) -> BoxIter {
    Box::new(map.into_values())
}

/// 映射的键值对，每项为`[键, 值]`双元素列表，产出顺序未指定。
pub fn items(map: FxHashMap<String, Value>) -> BoxIter {
    Box::new(map.into_iter().map(|(k, v)| Value::List(vec![Value::Str(k), v])))
}

/// 生成整数序列，两端均包含。
///
/// 步长为负时逆序产出；步长为0且范围非空时无限重复起始值，
/// 是否终止由调用方负责。
pub fn range(start: Integer, stop: Integer, step: Integer) -> BoxIter {
    let iter =
        RangeIter { start, end: stop, step: Integer::abs(step), next: start, next_back: stop, exhausted: false };
    if step < 0 { Box::new(iter.rev().map(Value::Int)) } else { Box::new(iter.map(Value::Int)) }
}

#[derive(Debug, Eq, PartialEq)]
struct RangeIter {
    start: Integer,
    end: Integer,
    step: Integer,
    next: Integer,
    next_back: Integer,
    exhausted: bool,
}

impl Iterator for RangeIter {
    type Item = Integer;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.next < self.start || self.next > self.end || self.next > self.next_back {
            return None;
        }
        let res = self.next;
        // 游标越过整数边界即耗尽，区间两端已全部产出
        match res.checked_add(self.step) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        Some(res)
    }
}

impl DoubleEndedIterator for RangeIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.next_back < self.start || self.next_back > self.end || self.next_back < self.next {
            return None;
        }
        let res = self.next_back;
        match res.checked_sub(self.step) {
            Some(next_back) => self.next_back = next_back,
            None => self.exhausted = true,
        }
        Some(res)
    }
}

/// 逐字符迭代持有的文本。
#[derive(Debug)]
struct OwnedChars {
    text: String,
    pos: usize,
}

impl OwnedChars {
    fn new(text: String) -> Self {
        Self { text, pos: 0 }
    }
}

impl Iterator for OwnedChars {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        let ch = self.text[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(Value::Str(ch.to_string()))
    }
}
