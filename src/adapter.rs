use crate::err::SeqErr;
use crate::source::{Source, iter};
use crate::value::Value;
use crate::{BoxIter, IterRes};
use rustc_hash::FxHashSet;

/// 按谓词过滤，只产出满足谓词的元素。
pub fn filter(src: impl Into<Source>, pred: impl FnMut(&Value) -> bool + 'static) -> IterRes {
    Ok(filter_iter(iter(src)?, pred))
}

/// 按默认真值谓词过滤。
pub fn filter_truthy(src: impl Into<Source>) -> IterRes {
    filter(src, Value::is_truthy)
}

/// 逐元素变换。变换结果本身可以是假值，不会被误判为耗尽。
pub fn map(src: impl Into<Source>, f: impl FnMut(Value) -> Value + 'static) -> IterRes {
    Ok(map_iter(iter(src)?, f))
}

/// 逐元素展开：对每个上游元素求值得到嵌套可迭代值，先排空内层再拉取下一个
/// 上游元素。内层值不可迭代属于调用方错误，拉取时直接中止。
pub fn flat_map(src: impl Into<Source>, f: impl FnMut(Value) -> Value + 'static) -> IterRes {
    Ok(flat_map_iter(iter(src)?, f))
}

/// 保留前`n`个元素，超出后不再拉取上游。
pub fn limit(src: impl Into<Source>, n: usize) -> IterRes {
    Ok(limit_iter(iter(src)?, n))
}

/// 丢弃前`n`个元素。构造时不拉取上游，首次消费时才按需丢弃；
/// 上游不足`n`个时提前耗尽，不会越界拉取。
pub fn skip(src: impl Into<Source>, n: usize) -> IterRes {
    Ok(skip_iter(iter(src)?, n))
}

/// 持续产出直到谓词首次不满足，此后永久耗尽。
pub fn take_while(src: impl Into<Source>, pred: impl FnMut(&Value) -> bool + 'static) -> IterRes {
    Ok(take_while_iter(iter(src)?, pred))
}

/// 持续丢弃直到谓词首次不满足，此后全部放行。
pub fn drop_while(src: impl Into<Source>, pred: impl FnMut(&Value) -> bool + 'static) -> IterRes {
    Ok(drop_while_iter(iter(src)?, pred))
}

/// 去重，按元素规范化键判等。已见集合随消费增长，不设上限。
pub fn distinct(src: impl Into<Source>) -> IterRes {
    Ok(distinct_iter(iter(src)?))
}

/// 旁路观察：每个产出的元素恰好回调一次，耗尽信号不回调。
pub fn peek(src: impl Into<Source>, consumer: impl FnMut(&Value) + 'static) -> IterRes {
    Ok(peek_iter(iter(src)?, consumer))
}

/// 循环产出。构造时立即排空整个上游到缓冲区（给定无限上游不会终止，
/// 属于调用方契约），此后无限循环产出，或在指定重复次数后耗尽。
pub fn cycle(src: impl Into<Source>, repeats: Option<usize>) -> IterRes {
    Ok(cycle_iter(iter(src)?, repeats))
}

/// 逆序产出。构造时立即排空整个上游到缓冲区。
pub fn reversed(src: impl Into<Source>) -> IterRes {
    Ok(reversed_iter(iter(src)?))
}

/// 并行拉取多个源：每次从左到右各拉取一个元素组成一行，
/// 任一源耗尽即整体耗尽。产出未装箱的多值行，装箱见[`multicollect`]。
pub fn zip(sources: Vec<Source>) -> Result<ZipIter, SeqErr> {
    let iters = sources.into_iter().map(iter).collect::<Result<Vec<_>, _>>()?;
    Ok(ZipIter { iters })
}

/// 将多值行装箱为列表元素，使其可以继续流入普通流水线。
pub fn multicollect(rows: impl Iterator<Item = Vec<Value>> + 'static) -> BoxIter {
    Box::new(rows.map(Value::List))
}

pub(crate) fn filter_iter(iter: BoxIter, mut pred: impl FnMut(&Value) -> bool + 'static) -> BoxIter {
    Box::new(iter.filter(move |value| pred(value)))
}

pub(crate) fn map_iter(iter: BoxIter, f: impl FnMut(Value) -> Value + 'static) -> BoxIter {
    Box::new(iter.map(f))
}

pub(crate) fn flat_map_iter(iter: BoxIter, f: impl FnMut(Value) -> Value + 'static) -> BoxIter {
    Box::new(FlatMapIter { outer: iter, inner: None, f })
}

pub(crate) fn limit_iter(iter: BoxIter, n: usize) -> BoxIter {
    Box::new(iter.take(n))
}

pub(crate) fn skip_iter(iter: BoxIter, n: usize) -> BoxIter {
    Box::new(iter.skip(n))
}

pub(crate) fn take_while_iter(iter: BoxIter, mut pred: impl FnMut(&Value) -> bool + 'static) -> BoxIter {
    Box::new(iter.take_while(move |value| pred(value)))
}

pub(crate) fn drop_while_iter(iter: BoxIter, mut pred: impl FnMut(&Value) -> bool + 'static) -> BoxIter {
    Box::new(iter.skip_while(move |value| pred(value)))
}

pub(crate) fn distinct_iter(iter: BoxIter) -> BoxIter {
    let mut seen = FxHashSet::default();
    Box::new(iter.filter(move |value| seen.insert(value.key())))
}

pub(crate) fn peek_iter(iter: BoxIter, mut consumer: impl FnMut(&Value) + 'static) -> BoxIter {
    Box::new(iter.inspect(move |value| consumer(value)))
}

pub(crate) fn cycle_iter(iter: BoxIter, repeats: Option<usize>) -> BoxIter {
    let buffer: Vec<Value> = iter.collect();
    match repeats {
        Some(n) => {
            let total = n.saturating_mul(buffer.len());
            Box::new(CycleIter::new(buffer).take(total))
        }
        None => Box::new(CycleIter::new(buffer)),
    }
}

pub(crate) fn reversed_iter(iter: BoxIter) -> BoxIter {
    let buffer: Vec<Value> = iter.collect();
    Box::new(buffer.into_iter().rev())
}

/// 外层/内层双槽展开迭代器。
struct FlatMapIter<F> {
    outer: BoxIter,
    inner: Option<BoxIter>,
    f: F,
}

impl<F> Iterator for FlatMapIter<F>
where
    F: FnMut(Value) -> Value,
{
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(inner) = &mut self.inner {
                if let Some(value) = inner.next() {
                    return Some(value);
                }
                self.inner = None;
            }
            let nested = (self.f)(self.outer.next()?);
            match iter(nested) {
                Ok(inner) => self.inner = Some(inner),
                Err(err) => panic!("{err}"),
            }
        }
    }
}

struct CycleIter {
    buffer: Vec<Value>,
    pos: usize,
}

impl CycleIter {
    fn new(buffer: Vec<Value>) -> Self {
        Self { buffer, pos: 0 }
    }
}

impl Iterator for CycleIter {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() {
            return None;
        }
        let value = self.buffer[self.pos].clone();
        self.pos = (self.pos + 1) % self.buffer.len();
        Some(value)
    }
}

/// 多源并行拉取迭代器，产出未装箱的多值行。
pub struct ZipIter {
    iters: Vec<BoxIter>,
}

impl Iterator for ZipIter {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iters.is_empty() {
            return None;
        }
        let mut row = Vec::with_capacity(self.iters.len());
        for iter in &mut self.iters {
            row.push(iter.next()?);
        }
        Some(row)
    }
}
