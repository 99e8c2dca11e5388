//! Axis/sequence iterator primitives.
//!
//! Axis iterators are stateful cursors: not started until the first call to
//! [`AxisIterator::next`], then positioned at a node, then exhausted.
//! Calling `next` past exhaustion keeps returning `None`. `another` hands
//! out a fresh not-started cursor over the same logical sequence without
//! disturbing the original, which re-scanning algorithms (positional
//! numbering in particular) depend on.
//!
//! Optional capabilities are probed through default methods returning
//! `None`: [`AxisIterator::last_position`] for iterators that know their
//! length without being consumed, and [`AxisIterator::to_reverse`] for
//! iterators that can produce the same sequence in reverse order.

use core::marker::PhantomData;
use std::sync::Arc;

use crate::model::{NodeTest, XdmNode};

/// A cursor over a sequence of nodes.
pub trait AxisIterator<N: Clone + Send + Sync + 'static>: Send {
    /// Advance and return the next node, or `None` once exhausted.
    fn next(&mut self) -> Option<N>;

    /// The node the cursor is positioned at, if any.
    fn current(&self) -> Option<&N>;

    /// Number of nodes returned so far (1-based position of `current`).
    fn position(&self) -> usize;

    /// A fresh not-started cursor over the same logical sequence.
    fn another(&self) -> Box<dyn AxisIterator<N>>;

    /// Total sequence length, when known without consuming the cursor.
    fn last_position(&self) -> Option<usize> {
        None
    }

    /// A not-started cursor over the same sequence in reverse order, when
    /// the iterator supports it.
    fn to_reverse(&self) -> Option<Box<dyn AxisIterator<N>>> {
        None
    }
}

impl<N: Clone + Send + Sync + 'static> core::fmt::Debug for dyn AxisIterator<N> + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AxisIterator")
            .field("position", &self.position())
            .finish_non_exhaustive()
    }
}

/// Drain a cursor into a `Vec`.
pub fn collect<N: Clone + Send + Sync + 'static>(mut it: Box<dyn AxisIterator<N>>) -> Vec<N> {
    let mut out = Vec::new();
    while let Some(n) = it.next() {
        out.push(n);
    }
    out
}

/// The empty sequence.
#[derive(Debug, Clone, Default)]
pub struct EmptyIterator<N> {
    _marker: PhantomData<N>,
}

impl<N> EmptyIterator<N> {
    pub fn new() -> Self {
        EmptyIterator {
            _marker: PhantomData,
        }
    }
}

impl<N: Clone + Send + Sync + 'static> AxisIterator<N> for EmptyIterator<N> {
    fn next(&mut self) -> Option<N> {
        None
    }

    fn current(&self) -> Option<&N> {
        None
    }

    fn position(&self) -> usize {
        0
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(EmptyIterator::new())
    }

    fn last_position(&self) -> Option<usize> {
        Some(0)
    }

    fn to_reverse(&self) -> Option<Box<dyn AxisIterator<N>>> {
        Some(Box::new(EmptyIterator::new()))
    }
}

/// A single-node sequence.
#[derive(Debug, Clone)]
pub struct SingletonIterator<N> {
    item: N,
    done: bool,
    current: Option<N>,
}

impl<N> SingletonIterator<N> {
    pub fn new(item: N) -> Self {
        SingletonIterator {
            item,
            done: false,
            current: None,
        }
    }
}

impl<N: Clone + Send + Sync + 'static> AxisIterator<N> for SingletonIterator<N> {
    fn next(&mut self) -> Option<N> {
        if self.done {
            self.current = None;
            return None;
        }
        self.done = true;
        self.current = Some(self.item.clone());
        self.current.clone()
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        usize::from(self.done)
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(SingletonIterator::new(self.item.clone()))
    }

    fn last_position(&self) -> Option<usize> {
        Some(1)
    }

    fn to_reverse(&self) -> Option<Box<dyn AxisIterator<N>>> {
        Some(Box::new(SingletonIterator::new(self.item.clone())))
    }
}

/// Forward cursor over a shared slice window.
#[derive(Debug, Clone)]
pub struct ArrayIterator<N> {
    items: Arc<[N]>,
    start: usize,
    end: usize,
    index: usize,
    current: Option<N>,
}

impl<N> ArrayIterator<N> {
    pub fn new(items: impl Into<Arc<[N]>>) -> Self {
        let items = items.into();
        let end = items.len();
        ArrayIterator {
            items,
            start: 0,
            end,
            index: 0,
            current: None,
        }
    }

    /// Cursor over `items[start..end]`.
    pub fn window(items: Arc<[N]>, start: usize, end: usize) -> Self {
        let end = end.min(items.len());
        let start = start.min(end);
        ArrayIterator {
            items,
            start,
            end,
            index: start,
            current: None,
        }
    }
}

impl<N: Clone + Send + Sync + 'static> AxisIterator<N> for ArrayIterator<N> {
    fn next(&mut self) -> Option<N> {
        if self.index >= self.end {
            self.current = None;
            return None;
        }
        let item = self.items[self.index].clone();
        self.index += 1;
        self.current = Some(item.clone());
        Some(item)
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.index - self.start
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(ArrayIterator::window(
            Arc::clone(&self.items),
            self.start,
            self.end,
        ))
    }

    fn last_position(&self) -> Option<usize> {
        Some(self.end - self.start)
    }

    fn to_reverse(&self) -> Option<Box<dyn AxisIterator<N>>> {
        Some(Box::new(ReverseArrayIterator::window(
            Arc::clone(&self.items),
            self.start,
            self.end,
        )))
    }
}

/// Backward cursor over a shared slice window.
#[derive(Debug, Clone)]
pub struct ReverseArrayIterator<N> {
    items: Arc<[N]>,
    start: usize,
    end: usize,
    index: usize,
    current: Option<N>,
}

impl<N> ReverseArrayIterator<N> {
    pub fn new(items: impl Into<Arc<[N]>>) -> Self {
        let items = items.into();
        let end = items.len();
        ReverseArrayIterator {
            items,
            start: 0,
            end,
            index: end,
            current: None,
        }
    }

    pub fn window(items: Arc<[N]>, start: usize, end: usize) -> Self {
        let end = end.min(items.len());
        let start = start.min(end);
        ReverseArrayIterator {
            items,
            start,
            end,
            index: end,
            current: None,
        }
    }
}

impl<N: Clone + Send + Sync + 'static> AxisIterator<N> for ReverseArrayIterator<N> {
    fn next(&mut self) -> Option<N> {
        if self.index <= self.start {
            self.current = None;
            return None;
        }
        self.index -= 1;
        let item = self.items[self.index].clone();
        self.current = Some(item.clone());
        Some(item)
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.end - self.index
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(ReverseArrayIterator::window(
            Arc::clone(&self.items),
            self.start,
            self.end,
        ))
    }

    fn last_position(&self) -> Option<usize> {
        Some(self.end - self.start)
    }

    fn to_reverse(&self) -> Option<Box<dyn AxisIterator<N>>> {
        Some(Box::new(ArrayIterator::window(
            Arc::clone(&self.items),
            self.start,
            self.end,
        )))
    }
}

/// One extra node in front of a base sequence.
pub struct PrependIterator<N> {
    head: N,
    tail: Box<dyn AxisIterator<N>>,
    head_done: bool,
    current: Option<N>,
    position: usize,
}

impl<N: Clone + Send + Sync + 'static> PrependIterator<N> {
    pub fn new(head: N, tail: Box<dyn AxisIterator<N>>) -> Self {
        PrependIterator {
            head,
            tail,
            head_done: false,
            current: None,
            position: 0,
        }
    }
}

impl<N: Clone + Send + Sync + 'static> AxisIterator<N> for PrependIterator<N> {
    fn next(&mut self) -> Option<N> {
        let item = if self.head_done {
            self.tail.next()
        } else {
            self.head_done = true;
            Some(self.head.clone())
        };
        match item {
            Some(n) => {
                self.position += 1;
                self.current = Some(n.clone());
                Some(n)
            }
            None => {
                self.current = None;
                None
            }
        }
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(PrependIterator::new(self.head.clone(), self.tail.another()))
    }

    fn last_position(&self) -> Option<usize> {
        self.tail.last_position().map(|n| n + 1)
    }
}

/// Applies a node test as a filter over a base cursor.
pub struct FilterIterator<N: XdmNode> {
    base: Box<dyn AxisIterator<N>>,
    test: Arc<dyn NodeTest<N>>,
    current: Option<N>,
    position: usize,
}

impl<N: XdmNode> FilterIterator<N> {
    pub fn new(base: Box<dyn AxisIterator<N>>, test: Arc<dyn NodeTest<N>>) -> Self {
        FilterIterator {
            base,
            test,
            current: None,
            position: 0,
        }
    }
}

impl<N: XdmNode> AxisIterator<N> for FilterIterator<N> {
    fn next(&mut self) -> Option<N> {
        while let Some(n) = self.base.next() {
            if self.test.matches(&n) {
                self.position += 1;
                self.current = Some(n.clone());
                return Some(n);
            }
        }
        self.current = None;
        None
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(FilterIterator::new(
            self.base.another(),
            Arc::clone(&self.test),
        ))
    }
}
