use thiserror::Error;

/// Binary min-heap stored in a vector, root at index 0.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap { elements: vec![] }
    }

    pub fn heap_size(&self) -> usize {
        self.elements.len()
    }

    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn left(i: usize) -> usize {
        2 * i + 1
    }

    fn right(i: usize) -> usize {
        2 * i + 2
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeapErr {
    #[error("extract from empty heap")]
    HeapUnderflow,
}

impl<T: Ord> MinHeap<T> {
    pub fn build(source: Vec<T>) -> Self {
        let mut heap = MinHeap { elements: source };
        let n = heap.heap_size();
        for i in (0..n / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    pub fn valid_min_heap(&self) -> bool {
        (1..self.heap_size()).all(|i| self.elements[Self::parent(i)] <= self.elements[i])
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap_size();
        loop {
            let l = Self::left(i);
            let r = Self::right(i);
            let mut smallest = i;

            if l < n && self.elements[l] < self.elements[smallest] {
                smallest = l;
            }
            if r < n && self.elements[r] < self.elements[smallest] {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.elements.swap(i, smallest);
            i = smallest;
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = Self::parent(i);
            if self.elements[i] >= self.elements[p] {
                break;
            }
            self.elements.swap(i, p);
            i = p;
        }
    }

    pub fn insert(&mut self, value: T) {
        self.elements.push(value);
        self.sift_up(self.heap_size() - 1);
        debug_assert!(self.valid_min_heap());
    }

    pub fn extract_min(&mut self) -> Result<T, HeapErr> {
        if self.elements.is_empty() {
            return Err(HeapErr::HeapUnderflow);
        }
        let result = self.elements.swap_remove(0);
        if !self.elements.is_empty() {
            self.sift_down(0);
        }
        Ok(result)
    }

    /// Removes the minimum if there is one.
    pub fn pop(&mut self) -> Option<T> {
        self.extract_min().ok()
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_drain_sorted() {
        let mut heap = MinHeap::build(vec![9, 4, 7, 1, 8, 2, 2, 6]);
        assert!(heap.valid_min_heap());

        let mut drained = Vec::new();
        while let Ok(x) = heap.extract_min() {
            drained.push(x);
        }
        assert_eq!(drained, vec![1, 2, 2, 4, 6, 7, 8, 9]);
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut heap = MinHeap::new();
        for x in [5, 3, 8, 1, 1, 0] {
            heap.insert(x);
        }
        assert_eq!(heap.heap_size(), 6);
        assert_eq!(heap.extract_min(), Ok(0));
        assert_eq!(heap.extract_min(), Ok(1));
        assert_eq!(heap.extract_min(), Ok(1));
        assert_eq!(heap.heap_size(), 3);
    }

    #[test]
    fn test_underflow() {
        let mut heap: MinHeap<u32> = MinHeap::default();
        assert_eq!(heap.heap_size(), 0);
        assert_eq!(heap.extract_min(), Err(HeapErr::HeapUnderflow));
        assert_eq!(heap.pop(), None);
    }
}
