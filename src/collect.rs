use crate::err::SeqErr;
use crate::source::{Source, iter};
use crate::value::{Num, Value};
use crate::{Float, Integer, SeqRes};
use itertools::Itertools;

/// 聚合器：每次聚合创建一个新实例，按产出顺序逐个接收元素，
/// 耗尽后恰好终结一次并交出聚合结果。
pub trait Collector {
    /// 接收一个元素，更新内部累积状态。
    fn accept(&mut self, value: Value);
    /// 终结并交出聚合结果。
    fn finalize(self: Box<Self>) -> Value;
}

/// 收集为列表。
pub fn table() -> Box<dyn Collector> {
    Box::new(ToList { items: Vec::new() })
}

/// 计数。
pub fn count() -> Box<dyn Collector> {
    Box::new(Count { count: 0 })
}

/// 求和，初值为整数0，遇到浮点数后提升为浮点数。
/// 非数值元素属于调用方错误，接收时直接中止。
pub fn sum() -> Box<dyn Collector> {
    Box::new(Sum { acc: Num::Integer(0) })
}

/// 最小值，首个元素作为初始状态，空输入得到`Nil`。
pub fn min() -> Box<dyn Collector> {
    Box::new(Extreme { best: None, keep_less: true })
}

/// 最大值，首个元素作为初始状态，空输入得到`Nil`。
pub fn max() -> Box<dyn Collector> {
    Box::new(Extreme { best: None, keep_less: false })
}

/// 平均值，空输入得到`Nil`。非数值元素属于调用方错误，接收时直接中止。
pub fn average() -> Box<dyn Collector> {
    Box::new(Average { sum: 0.0, count: 0 })
}

/// 按分隔符拼接为文本，无分隔需求时传入空字符串。
pub fn join(delimiter: impl Into<String>) -> Box<dyn Collector> {
    Box::new(Join { delimiter: delimiter.into(), prefix: String::new(), postfix: String::new(), parts: Vec::new() })
}

/// 按分隔符拼接为文本，并附加前缀与后缀。
pub fn join_wrapped(
    delimiter: impl Into<String>, prefix: impl Into<String>, postfix: impl Into<String>,
) -> Box<dyn Collector> {
    Box::new(Join { delimiter: delimiter.into(), prefix: prefix.into(), postfix: postfix.into(), parts: Vec::new() })
}

/// 最后一个元素，空输入得到`Nil`。
pub fn last() -> Box<dyn Collector> {
    Box::new(Last { last: None })
}

/// 完整消费输入并收集为列表。
pub fn collect(src: impl Into<Source>) -> SeqRes<Value> {
    collect_with(src, table)
}

/// 以指定聚合器工厂完整消费输入：每个元素按序送入`accept`，
/// 耗尽后调用一次`finalize`。对无限输入不会终止，属于调用方契约。
pub fn collect_with(src: impl Into<Source>, factory: impl FnOnce() -> Box<dyn Collector>) -> SeqRes<Value> {
    let mut collector = factory();
    for value in iter(src)? {
        collector.accept(value);
    }
    Ok(collector.finalize())
}

/// 左折叠：从种子开始逐元素累积，空输入原样返回种子。
pub fn reduce(src: impl Into<Source>, seed: Value, mut op: impl FnMut(Value, Value) -> Value) -> SeqRes<Value> {
    let mut acc = seed;
    for value in iter(src)? {
        acc = op(acc, value);
    }
    Ok(acc)
}

/// 逐元素消费，无返回值。
pub fn each(src: impl Into<Source>, mut consumer: impl FnMut(Value)) -> SeqRes<()> {
    for value in iter(src)? {
        consumer(value);
    }
    Ok(())
}

/// 任一元素满足谓词即为真，遇到首个满足的元素立即短路；空输入为假。
pub fn any(src: impl Into<Source>, mut pred: impl FnMut(&Value) -> bool) -> SeqRes<bool> {
    for value in iter(src)? {
        if pred(&value) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// 全部元素满足谓词才为真，遇到首个不满足的元素立即短路；空输入为真。
pub fn all(src: impl Into<Source>, mut pred: impl FnMut(&Value) -> bool) -> SeqRes<bool> {
    for value in iter(src)? {
        if !pred(&value) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// 按默认真值谓词判定[`any`]。
pub fn any_truthy(src: impl Into<Source>) -> SeqRes<bool> {
    any(src, Value::is_truthy)
}

/// 按默认真值谓词判定[`all`]。
pub fn all_truthy(src: impl Into<Source>) -> SeqRes<bool> {
    all(src, Value::is_truthy)
}

struct ToList {
    items: Vec<Value>,
}

impl Collector for ToList {
    fn accept(&mut self, value: Value) {
        self.items.push(value);
    }

    fn finalize(self: Box<Self>) -> Value {
        Value::List(self.items)
    }
}

struct Count {
    count: usize,
}

impl Collector for Count {
    fn accept(&mut self, _: Value) {
        self.count += 1;
    }

    fn finalize(self: Box<Self>) -> Value {
        Value::Int(self.count as Integer)
    }
}

struct Sum {
    acc: Num,
}

impl Collector for Sum {
    fn accept(&mut self, value: Value) {
        match value.as_num() {
            Some(num) => self.acc = self.acc.add(num),
            None => panic!("{}", SeqErr::NonNumericElement { kind: value.type_name() }),
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        self.acc.into_value()
    }
}

struct Extreme {
    best: Option<Value>,
    keep_less: bool,
}

impl Collector for Extreme {
    fn accept(&mut self, value: Value) {
        match &self.best {
            None => self.best = Some(value),
            Some(best) => {
                let replace = if self.keep_less {
                    value.total_cmp(best) == std::cmp::Ordering::Less
                } else {
                    value.total_cmp(best) == std::cmp::Ordering::Greater
                };
                if replace {
                    self.best = Some(value);
                }
            }
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        self.best.unwrap_or(Value::Nil)
    }
}

struct Average {
    sum: Float,
    count: usize,
}

impl Collector for Average {
    fn accept(&mut self, value: Value) {
        match value.as_num() {
            Some(num) => {
                self.sum += num.as_float();
                self.count += 1;
            }
            None => panic!("{}", SeqErr::NonNumericElement { kind: value.type_name() }),
        }
    }

    fn finalize(self: Box<Self>) -> Value {
        if self.count == 0 { Value::Nil } else { Value::Float(self.sum / self.count as Float) }
    }
}

struct Join {
    delimiter: String,
    prefix: String,
    postfix: String,
    parts: Vec<String>,
}

impl Collector for Join {
    fn accept(&mut self, value: Value) {
        self.parts.push(value.to_string());
    }

    fn finalize(self: Box<Self>) -> Value {
        Value::Str(format!("{}{}{}", self.prefix, self.parts.iter().join(&self.delimiter), self.postfix))
    }
}

struct Last {
    last: Option<Value>,
}

impl Collector for Last {
    fn accept(&mut self, value: Value) {
        self.last = Some(value);
    }

    fn finalize(self: Box<Self>) -> Value {
        self.last.unwrap_or(Value::Nil)
    }
}
