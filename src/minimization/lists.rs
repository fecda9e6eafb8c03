use crate::{StateId, EMPTY_STATE};

/// A family of disjoint doubly linked lists over the dense element ids `0..elements`, stored as
/// a struct of arrays. Every element is in at most one list at a time, lists are numbered
/// `0..lists` and track their length. [`EMPTY_STATE`] terminates lists and marks elements that
/// are not linked.
///
/// Splicing an element into a list and unlinking it are both O(1); the caller is responsible
/// for passing the list an element is currently in when unlinking it.
#[derive(Debug, Clone)]
pub(crate) struct IntrusiveLists {
    next: Vec<StateId>,
    prev: Vec<StateId>,
    head: Vec<StateId>,
    len: Vec<u32>,
}

impl IntrusiveLists {
    pub fn new(elements: usize, lists: usize) -> Self {
        Self {
            next: vec![EMPTY_STATE; elements],
            prev: vec![EMPTY_STATE; elements],
            head: vec![EMPTY_STATE; lists],
            len: vec![0; lists],
        }
    }

    /// Makes `element` the new head of `list`.
    pub fn push_front(&mut self, list: u32, element: StateId) {
        let list = list as usize;
        let old_head = self.head[list];
        self.prev[element as usize] = EMPTY_STATE;
        self.next[element as usize] = old_head;
        if old_head != EMPTY_STATE {
            self.prev[old_head as usize] = element;
        }
        self.head[list] = element;
        self.len[list] += 1;
    }

    /// Removes `element` from `list`, which must be the list it is linked into.
    pub fn unlink(&mut self, list: u32, element: StateId) {
        let list = list as usize;
        let prev = self.prev[element as usize];
        let next = self.next[element as usize];
        if prev != EMPTY_STATE {
            self.next[prev as usize] = next;
        } else {
            debug_assert_eq!(self.head[list], element);
            self.head[list] = next;
        }
        if next != EMPTY_STATE {
            self.prev[next as usize] = prev;
        }
        self.prev[element as usize] = EMPTY_STATE;
        self.next[element as usize] = EMPTY_STATE;
        self.len[list] -= 1;
    }

    #[inline]
    pub fn head(&self, list: u32) -> StateId {
        self.head[list as usize]
    }

    #[inline]
    pub fn next(&self, element: StateId) -> StateId {
        self.next[element as usize]
    }

    #[inline]
    pub fn len(&self, list: u32) -> u32 {
        self.len[list as usize]
    }

    pub fn iter(&self, list: u32) -> ListIter<'_> {
        ListIter {
            lists: self,
            current: self.head(list),
        }
    }
}

/// Iterator over the elements of one list of an [`IntrusiveLists`], head first.
pub(crate) struct ListIter<'a> {
    lists: &'a IntrusiveLists,
    current: StateId,
}

impl Iterator for ListIter<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == EMPTY_STATE {
            return None;
        }
        let element = self.current;
        self.current = self.lists.next(element);
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::IntrusiveLists;

    #[test]
    fn splice_and_unlink() {
        let mut lists = IntrusiveLists::new(5, 2);
        for element in (0..5).rev() {
            lists.push_front(0, element);
        }
        assert_eq!(lists.iter(0).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

        // head, middle and tail
        lists.unlink(0, 0);
        lists.push_front(1, 0);
        lists.unlink(0, 2);
        lists.push_front(1, 2);
        lists.unlink(0, 4);
        lists.push_front(1, 4);

        assert_eq!(lists.iter(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(lists.iter(1).collect::<Vec<_>>(), vec![4, 2, 0]);
        assert_eq!((lists.len(0), lists.len(1)), (2, 3));

        lists.unlink(0, 1);
        lists.unlink(0, 3);
        assert_eq!(lists.iter(0).count(), 0);
        assert_eq!(lists.len(0), 0);
        assert_eq!(lists.head(0), crate::EMPTY_STATE);
    }
}
