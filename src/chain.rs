use crate::adapter::{
    cycle_iter, distinct_iter, drop_while_iter, filter_iter, flat_map_iter, limit_iter, map_iter, peek_iter,
    reversed_iter, skip_iter, take_while_iter,
};
use crate::collect::Collector;
use crate::err::SeqErr;
use crate::source::{Source, iter, range};
use crate::value::Value;
use crate::{BoxIter, ChainRes, Integer};

/// 链式包装器：同一时刻只持有一个活跃迭代器，每个链式操作以新迭代器
/// 替换旧迭代器并移动返回自身。
///
/// 终结操作借用`&mut self`消费当前迭代器，短路终结后继续链式操作会从
/// 消费中断处继续，而不是重新开始。包装器本身实现[`Iterator`]，
/// 可直接用于`for`循环，也可作为另一条链的输入源。
pub struct Chain {
    iter: BoxIter,
}

/// 从任意输入源构建链，缺失输入得到空链。
pub fn from(src: impl Into<Source>) -> ChainRes {
    Ok(Chain { iter: iter(src)? })
}

/// 依次串联多个输入源构建链。
pub fn concat(sources: Vec<Source>) -> ChainRes {
    let iters = sources.into_iter().map(iter).collect::<Result<Vec<_>, SeqErr>>()?;
    Ok(Chain { iter: Box::new(iters.into_iter().flatten()) })
}

impl Chain {
    /// 空链。
    pub fn new() -> Chain {
        Chain { iter: Box::new(std::iter::empty()) }
    }

    /// 整数序列链，语义同[`range`]。
    pub fn range(start: Integer, stop: Integer, step: Integer) -> Chain {
        Chain { iter: range(start, stop, step) }
    }

    /// 重复单个值：指定次数，或无限重复。
    pub fn repeat(value: Value, count: Option<usize>) -> Chain {
        match count {
            Some(n) => Chain { iter: Box::new(std::iter::repeat_n(value, n)) },
            None => Chain { iter: Box::new(std::iter::repeat(value)) },
        }
    }

    pub fn op_filter(self, pred: impl FnMut(&Value) -> bool + 'static) -> Chain {
        Chain { iter: filter_iter(self.iter, pred) }
    }

    pub fn op_filter_truthy(self) -> Chain {
        Chain { iter: filter_iter(self.iter, Value::is_truthy) }
    }

    pub fn op_map(self, f: impl FnMut(Value) -> Value + 'static) -> Chain {
        Chain { iter: map_iter(self.iter, f) }
    }

    pub fn op_flat_map(self, f: impl FnMut(Value) -> Value + 'static) -> Chain {
        Chain { iter: flat_map_iter(self.iter, f) }
    }

    pub fn op_limit(self, n: usize) -> Chain {
        Chain { iter: limit_iter(self.iter, n) }
    }

    pub fn op_skip(self, n: usize) -> Chain {
        Chain { iter: skip_iter(self.iter, n) }
    }

    pub fn op_take_while(self, pred: impl FnMut(&Value) -> bool + 'static) -> Chain {
        Chain { iter: take_while_iter(self.iter, pred) }
    }

    pub fn op_drop_while(self, pred: impl FnMut(&Value) -> bool + 'static) -> Chain {
        Chain { iter: drop_while_iter(self.iter, pred) }
    }

    pub fn op_distinct(self) -> Chain {
        Chain { iter: distinct_iter(self.iter) }
    }

    pub fn op_peek(self, consumer: impl FnMut(&Value) + 'static) -> Chain {
        Chain { iter: peek_iter(self.iter, consumer) }
    }

    /// 急切操作：立即排空当前迭代器，见[`crate::cycle`]。
    pub fn op_cycle(self, repeats: Option<usize>) -> Chain {
        Chain { iter: cycle_iter(self.iter, repeats) }
    }

    /// 急切操作：立即排空当前迭代器，见[`crate::reversed`]。
    pub fn op_reversed(self) -> Chain {
        Chain { iter: reversed_iter(self.iter) }
    }

    /// 急切操作：立即排空当前迭代器并按全序排序。
    pub fn op_sorted(self, desc: bool) -> Chain {
        let mut buffer: Vec<Value> = self.iter.collect();
        buffer.sort_by(Value::total_cmp);
        if desc {
            buffer.reverse();
        }
        Chain { iter: Box::new(buffer.into_iter()) }
    }

    /// 通用扩展点：以任意迭代器变换替换当前迭代器，收集器见[`crate::batch`]
    /// 与[`crate::window`]。
    pub fn apply(self, adapter: impl FnOnce(BoxIter) -> BoxIter) -> Chain {
        Chain { iter: adapter(self.iter) }
    }

    /// 逐元素消费当前迭代器。
    pub fn each(&mut self, mut consumer: impl FnMut(Value)) {
        for value in self.iter.by_ref() {
            consumer(value);
        }
    }

    /// 左折叠当前迭代器，空链原样返回种子。
    pub fn reduce(&mut self, seed: Value, mut op: impl FnMut(Value, Value) -> Value) -> Value {
        let mut acc = seed;
        for value in self.iter.by_ref() {
            acc = op(acc, value);
        }
        acc
    }

    /// 完整消费当前迭代器并收集为列表。
    pub fn collect_list(&mut self) -> Value {
        let mut items = Vec::new();
        for value in self.iter.by_ref() {
            items.push(value);
        }
        Value::List(items)
    }

    /// 以指定聚合器工厂完整消费当前迭代器。
    pub fn collect_with(&mut self, factory: impl FnOnce() -> Box<dyn Collector>) -> Value {
        let mut collector = factory();
        for value in self.iter.by_ref() {
            collector.accept(value);
        }
        collector.finalize()
    }

    /// 完整消费当前迭代器并计数。
    pub fn count(&mut self) -> usize {
        self.iter.by_ref().count()
    }

    /// 任一元素满足谓词即为真，短路消费到首个满足的元素处；空链为假。
    pub fn any(&mut self, mut pred: impl FnMut(&Value) -> bool) -> bool {
        for value in self.iter.by_ref() {
            if pred(&value) {
                return true;
            }
        }
        false
    }

    /// 全部元素满足谓词才为真，短路消费到首个不满足的元素处；空链为真。
    pub fn all(&mut self, mut pred: impl FnMut(&Value) -> bool) -> bool {
        for value in self.iter.by_ref() {
            if !pred(&value) {
                return false;
            }
        }
        true
    }

    /// 按默认真值谓词判定[`Chain::any`]。
    pub fn any_truthy(&mut self) -> bool {
        self.any(Value::is_truthy)
    }

    /// 按默认真值谓词判定[`Chain::all`]。
    pub fn all_truthy(&mut self) -> bool {
        self.all(Value::is_truthy)
    }
}

impl Default for Chain {
    fn default() -> Self {
        Chain::new()
    }
}

impl Iterator for Chain {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{collect, join, sum};
    use crate::gather::batch;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
        values.into_iter().map(Value::Int).collect()
    }

    #[test]
    fn test_chain_fluent_composition() {
        let result = from(Source::seq([1, 2, 3, 4, 5, 6]))
            .unwrap()
            .op_filter(|v| matches!(v, Value::Int(i) if i % 2 == 0))
            .op_map(|v| match v {
                Value::Int(i) => Value::Int(i * 10),
                other => other,
            })
            .op_limit(2)
            .collect_list();
        assert_eq!(result, Value::List(ints([20, 40])));
    }

    #[test]
    fn test_chain_is_lazy_until_first_pull() {
        let calls = Rc::new(Cell::new(0));
        let (filter_calls, map_calls) = (calls.clone(), calls.clone());
        let mut chain = from(Source::seq([1, 2, 3]))
            .unwrap()
            .op_filter(move |_| {
                filter_calls.set(filter_calls.get() + 1);
                true
            })
            .op_map(move |v| {
                map_calls.set(map_calls.get() + 1);
                v
            });
        assert_eq!(calls.get(), 0);
        assert_eq!(chain.next(), Some(Value::Int(1)));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_terminal_then_transition_continues() {
        let mut chain = Chain::range(1, 10, 1);
        // any 短路消费到首个匹配处
        assert!(chain.any(|v| *v == Value::Int(3)));
        let rest = chain.op_limit(2).collect_list();
        assert_eq!(rest, Value::List(ints([4, 5])));
    }

    #[test]
    fn test_terminal_count_consumes_remainder() {
        let mut chain = Chain::range(1, 5, 1);
        assert!(chain.any(|v| *v == Value::Int(2)));
        assert_eq!(Chain::count(&mut chain), 3);
        assert_eq!(chain.collect_list(), Value::List(vec![]));
    }

    #[test]
    fn test_terminal_any_all_short_circuit_and_empty() {
        let mut chain = from(Source::seq([1, 2, 0, 4])).unwrap();
        assert!(!chain.all(|v| v.is_truthy()));
        assert_eq!(chain.collect_list(), Value::List(ints([4])));

        assert!(!Chain::new().any(|_| true));
        assert!(Chain::new().all(|_| false));
    }

    #[test]
    fn test_terminal_truthy_defaults_keep_handle() {
        let mut chain = from(Source::seq([0, 0, 5, 0, 7])).unwrap();
        assert!(chain.any_truthy());
        assert_eq!(chain.collect_list(), Value::List(ints([0, 7])));

        assert!(from(Source::seq([1, 2])).unwrap().all_truthy());
        assert!(!from(Source::seq([1, 0])).unwrap().all_truthy());
        assert!(Chain::new().all_truthy());
        assert!(!Chain::new().any_truthy());
    }

    #[test]
    fn test_chain_as_source_of_another_chain() {
        let inner = Chain::range(1, 3, 1);
        let result = from(inner).unwrap().op_map(|v| match v {
            Value::Int(i) => Value::Int(i + 100),
            other => other,
        });
        assert_eq!(collect(result).unwrap(), Value::List(ints([101, 102, 103])));
    }

    #[test]
    fn test_chain_usable_in_for_loop() {
        let mut seen = Vec::new();
        for value in Chain::range(1, 3, 1) {
            seen.push(value);
        }
        assert_eq!(seen, ints([1, 2, 3]));
    }

    #[test]
    fn test_empty_chain() {
        assert_eq!(Chain::new().collect_list(), Value::List(vec![]));
    }

    #[test]
    fn test_from_nil_is_empty_chain() {
        assert_eq!(from(Value::Nil).unwrap().collect_list(), Value::List(vec![]));
    }

    #[test]
    fn test_concat_sources_in_order() {
        let result = concat(vec![Source::seq([1, 2]), Source::Nil, Source::seq([3])]).unwrap().collect_list();
        assert_eq!(result, Value::List(ints([1, 2, 3])));
    }

    #[test]
    fn test_repeat_with_count() {
        assert_eq!(Chain::repeat(Value::from("x"), Some(3)).collect_list().to_string(), "[x, x, x]");
    }

    #[test]
    fn test_repeat_unbounded() {
        let head: Vec<Value> = Chain::repeat(Value::Int(7), None).take(4).collect();
        assert_eq!(head, ints([7, 7, 7, 7]));
    }

    #[test]
    fn test_chain_reduce_and_collect_with() {
        let total = Chain::reduce(&mut Chain::range(1, 5, 1), Value::Int(0), |acc, v| match (acc, v) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
            (acc, _) => acc,
        });
        assert_eq!(total, Value::Int(15));
        assert_eq!(Chain::range(1, 5, 1).collect_with(sum), Value::Int(15));
        assert_eq!(
            from(Source::seq(["a", "b"])).unwrap().collect_with(|| join("-")),
            Value::Str("a-b".to_string())
        );
    }

    #[test]
    fn test_chain_take_drop_while() {
        let taken = Chain::range(1, 9, 1).op_take_while(|v| matches!(v, Value::Int(i) if *i < 4)).collect_list();
        assert_eq!(taken, Value::List(ints([1, 2, 3])));
        let dropped = Chain::range(1, 6, 1).op_drop_while(|v| matches!(v, Value::Int(i) if *i < 4)).collect_list();
        assert_eq!(dropped, Value::List(ints([4, 5, 6])));
    }

    #[test]
    fn test_chain_distinct_and_sorted() {
        let result = from(Source::seq([3, 1, 3, 2, 1])).unwrap().op_distinct().op_sorted(false).collect_list();
        assert_eq!(result, Value::List(ints([1, 2, 3])));
        let desc = from(Source::seq([3, 1, 2])).unwrap().op_sorted(true).collect_list();
        assert_eq!(desc, Value::List(ints([3, 2, 1])));
    }

    #[test]
    fn test_chain_cycle_limited() {
        let result = Chain::range(1, 3, 1).op_cycle(None).op_limit(10).collect_list();
        assert_eq!(result, Value::List(ints([1, 2, 3, 1, 2, 3, 1, 2, 3, 1])));
    }

    #[test]
    fn test_chain_reversed() {
        assert_eq!(Chain::range(1, 3, 1).op_reversed().collect_list(), Value::List(ints([3, 2, 1])));
    }

    #[test]
    fn test_chain_flat_map() {
        let result = from(Source::seq(["ab", "cd"])).unwrap().op_flat_map(|v| v).collect_with(|| join(""));
        assert_eq!(result, Value::Str("abcd".to_string()));
    }

    #[test]
    fn test_chain_peek_counts_only_yielded() {
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let result = Chain::range(1, 9, 1)
            .op_peek(move |_| counter.set(counter.get() + 1))
            .op_limit(3)
            .collect_list();
        assert_eq!(result, Value::List(ints([1, 2, 3])));
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn test_chain_apply_gatherer() {
        let result = Chain::range(1, 7, 1).apply(batch(3).unwrap()).collect_list();
        assert_eq!(
            result,
            Value::List(vec![
                Value::List(ints([1, 2, 3])),
                Value::List(ints([4, 5, 6])),
                Value::List(ints([7])),
            ])
        );
    }
}
