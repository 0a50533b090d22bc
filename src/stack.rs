use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("stack is empty")]
pub struct EmptyStack;

/// A plain LIFO stack.  Not for sharing between threads; each
/// computation owns its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Stack<T> {
        Stack { items: Vec::new() }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Result<T, EmptyStack> {
        self.items.pop().ok_or(EmptyStack)
    }

    pub fn peek(&self) -> Result<&T, EmptyStack> {
        self.items.last().ok_or(EmptyStack)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Pops everything, returning the items in the order they came off.
    pub fn drain(&mut self) -> Vec<T> {
        let mut result: Vec<T> = Vec::with_capacity(self.items.len());
        while let Ok(item) = self.pop() {
            result.push(item);
        }
        result
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Stack<T> {
        Stack::new()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Stack<T> {
        let mut stack = Stack::new();
        for item in iter {
            stack.push(item);
        }
        stack
    }
}

#[test]
fn test_new_stack_is_empty() {
    let stack: Stack<i32> = Stack::new();
    assert!(stack.is_empty());
    assert_eq!(stack.len(), 0);
}

#[test]
fn test_push_makes_nonempty() {
    let mut stack = Stack::new();
    stack.push(0);
    assert!(!stack.is_empty());
}

#[test]
fn test_pops_reverse_pushes() {
    let mut stack = Stack::new();
    for n in 0..4 {
        stack.push(n);
    }
    for expected in (0..4).rev() {
        assert_eq!(stack.pop(), Ok(expected));
    }
    assert!(stack.is_empty());
}

#[test]
fn test_peek_is_repeatable() {
    let mut stack = Stack::new();
    stack.push('(');
    stack.push('[');
    assert_eq!(stack.peek(), Ok(&'['));
    assert!(!stack.is_empty());
    assert_eq!(stack.peek(), Ok(&'['));
    assert!(!stack.is_empty());
    assert_eq!(stack.len(), 2);
}

#[test]
fn test_empty_stack_errors() {
    let mut stack: Stack<u8> = Stack::new();
    assert_eq!(stack.pop(), Err(EmptyStack));
    assert_eq!(stack.peek(), Err(EmptyStack));

    // Same again once drained.
    stack.push(1);
    stack.push(2);
    assert_eq!(stack.pop(), Ok(2));
    assert_eq!(stack.pop(), Ok(1));
    assert_eq!(stack.pop(), Err(EmptyStack));
    assert_eq!(stack.peek(), Err(EmptyStack));
}

#[test]
fn test_clear() {
    let mut stack: Stack<&str> = ["a", "b"].into_iter().collect();
    stack.clear();
    assert!(stack.is_empty());
    assert_eq!(stack.pop(), Err(EmptyStack));
}

#[test]
fn test_drain() {
    let mut stack: Stack<i32> = (1..=3).collect();
    assert_eq!(stack.drain(), vec![3, 2, 1]);
    assert!(stack.is_empty());
}
