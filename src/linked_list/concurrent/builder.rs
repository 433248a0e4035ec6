use alloc::boxed::Box;
use core::fmt;

use super::list::ConcurrentList;

/// Called exactly once on every value that leaves the list, on removal or at teardown.
pub type Destructor<T> = Box<dyn Fn(T) + Send + Sync>;

/// Writes one value when the list is rendered.
pub type Printer<T> = Box<dyn Fn(&mut dyn fmt::Write, &T) -> fmt::Result + Send + Sync>;

/// Builder for [`ConcurrentList`].
pub struct ConcurrentListBuilder<T> {
    destructor: Option<Destructor<T>>,
    printer: Option<Printer<T>>,
}

impl<T> Default for ConcurrentListBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentListBuilder<T> {
    /// Create a new builder. Values are dropped normally and there is no printer.
    pub fn new() -> Self {
        Self {
            destructor: None,
            printer: None,
        }
    }

    /// Set the function run on every value when it leaves the list.
    ///
    /// # Arguments
    /// * `destructor` - Takes ownership of the removed value
    ///
    /// # Returns
    /// The builder instance for method chaining
    pub fn with_destructor<F>(mut self, destructor: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.destructor = Some(Box::new(destructor));
        self
    }

    /// Set the function used to write each value in [`ConcurrentList::render`].
    ///
    /// # Returns
    /// The builder instance for method chaining
    pub fn with_printer<F>(mut self, printer: F) -> Self
    where
        F: Fn(&mut dyn fmt::Write, &T) -> fmt::Result + Send + Sync + 'static,
    {
        self.printer = Some(Box::new(printer));
        self
    }

    /// Build the list.
    pub fn build(self) -> ConcurrentList<T> {
        ConcurrentList::from_parts(self.destructor, self.printer)
    }
}
