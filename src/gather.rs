use crate::err::SeqErr;
use crate::value::Value;
use crate::{BoxIter, SeqRes};
use std::collections::VecDeque;

/// 定长分组收集器：每次从上游拉取至多`size`个元素组成一个列表产出，
/// 上游中途耗尽时最后一组可以不满。大小非法在构造时立即报错，
/// 不会拉取任何元素。
pub fn batch(size: usize) -> SeqRes<impl FnOnce(BoxIter) -> BoxIter> {
    if size == 0 {
        return Err(SeqErr::InvalidBatchSize { size });
    }
    Ok(move |iter: BoxIter| -> BoxIter { Box::new(BatchIter { source: iter, size }) })
}

/// 滑动窗口收集器：每拉取一个上游元素产出一次当前窗口，
/// 窗口从1逐步增长到`size`后保持并滑动。大小非法在构造时立即报错。
pub fn window(size: usize) -> SeqRes<impl FnOnce(BoxIter) -> BoxIter> {
    if size == 0 {
        return Err(SeqErr::InvalidWindowSize { size });
    }
    Ok(move |iter: BoxIter| -> BoxIter {
        Box::new(WindowIter { source: iter, size, buffer: VecDeque::with_capacity(size) })
    })
}

struct BatchIter {
    source: BoxIter,
    size: usize,
}

impl Iterator for BatchIter {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        let mut group = Vec::with_capacity(self.size);
        for _ in 0..self.size {
            if let Some(value) = self.source.next() {
                group.push(value);
            } else {
                break;
            }
        }
        if group.is_empty() { None } else { Some(Value::List(group)) }
    }
}

struct WindowIter {
    source: BoxIter,
    size: usize,
    buffer: VecDeque<Value>,
}

impl Iterator for WindowIter {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.source.next()?;
        self.buffer.push_back(value);
        if self.buffer.len() > self.size {
            self.buffer.pop_front();
        }
        Some(Value::List(self.buffer.iter().cloned().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Source, iter, range};

    fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
        values.into_iter().map(Value::Int).collect()
    }

    #[test]
    fn test_batch_groups_with_short_tail() {
        let groups: Vec<Value> = batch(3).unwrap()(range(1, 7, 1)).collect();
        assert_eq!(groups, vec![
            Value::List(ints([1, 2, 3])),
            Value::List(ints([4, 5, 6])),
            Value::List(ints([7])),
        ]);
    }

    #[test]
    fn test_batch_exact_division() {
        let groups: Vec<Value> = batch(2).unwrap()(range(1, 4, 1)).collect();
        assert_eq!(groups, vec![Value::List(ints([1, 2])), Value::List(ints([3, 4]))]);
    }

    #[test]
    fn test_batch_empty_source() {
        assert_eq!(batch(3).unwrap()(iter(Value::Nil).unwrap()).next(), None);
    }

    #[test]
    fn test_batch_invalid_size_fails_fast() {
        assert_eq!(batch(0).err(), Some(SeqErr::InvalidBatchSize { size: 0 }));
    }

    #[test]
    fn test_window_grows_then_slides() {
        let windows: Vec<Value> = window(3).unwrap()(range(1, 4, 1)).collect();
        assert_eq!(windows, vec![
            Value::List(ints([1])),
            Value::List(ints([1, 2])),
            Value::List(ints([1, 2, 3])),
            Value::List(ints([2, 3, 4])),
        ]);
    }

    #[test]
    fn test_window_size_one() {
        let windows: Vec<Value> = window(1).unwrap()(range(1, 3, 1)).collect();
        assert_eq!(windows, vec![
            Value::List(ints([1])),
            Value::List(ints([2])),
            Value::List(ints([3])),
        ]);
    }

    #[test]
    fn test_window_invalid_size_fails_fast() {
        assert_eq!(window(0).err(), Some(SeqErr::InvalidWindowSize { size: 0 }));
    }

    #[test]
    fn test_window_lazy_per_pull() {
        let mut windows = window(2).unwrap()(iter(Source::seq([1, 2, 3])).unwrap());
        assert_eq!(windows.next(), Some(Value::List(ints([1]))));
        assert_eq!(windows.next(), Some(Value::List(ints([1, 2]))));
        assert_eq!(windows.next(), Some(Value::List(ints([2, 3]))));
        assert_eq!(windows.next(), None);
    }
}
