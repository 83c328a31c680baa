use crate::error::BindResultError;

/// Result of binding, which either holds a bound value or signals that nothing was bound.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BindResult<T> {
    value: Option<T>,
}

impl<T> BindResult<T> {
    pub fn of(value: Option<T>) -> Self {
        Self { value }
    }

    pub fn unbound() -> Self {
        Self { value: None }
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the bound value or [BindResultError::NotBound].
    pub fn get(self) -> Result<T, BindResultError> {
        self.value.ok_or(BindResultError::NotBound)
    }

    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn if_bound(self, consumer: impl FnOnce(T)) {
        if let Some(value) = self.value {
            consumer(value);
        }
    }

    pub fn map<U>(self, mapper: impl FnOnce(T) -> U) -> BindResult<U> {
        BindResult {
            value: self.value.map(mapper),
        }
    }

    pub fn or_else(self, other: T) -> T {
        self.value.unwrap_or(other)
    }

    pub fn or_else_get(self, supplier: impl FnOnce() -> T) -> T {
        self.value.unwrap_or_else(supplier)
    }

    /// Returns the bound value or the result of a fallible supplier.
    pub fn or_else_try<E>(self, supplier: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        match self.value {
            Some(value) => Ok(value),
            None => supplier(),
        }
    }

    #[inline]
    pub fn into_option(self) -> Option<T> {
        self.value
    }
}

impl<T> From<Option<T>> for BindResult<T> {
    fn from(value: Option<T>) -> Self {
        Self::of(value)
    }
}

impl<T> Default for BindResult<T> {
    fn default() -> Self {
        Self::unbound()
    }
}

#[cfg(test)]
mod tests {
    use crate::bind_result::BindResult;
    use crate::error::BindResultError;

    #[test]
    fn should_return_bound_value() {
        let result = BindResult::of(Some(5));
        assert!(result.is_bound());
        assert_eq!(result.value(), Some(&5));
        assert_eq!(result.clone().map(|value| value * 2).get(), Ok(10));
        assert_eq!(result.or_else(1), 5);
    }

    #[test]
    fn should_fall_back_when_unbound() {
        let result = BindResult::<i32>::unbound();
        assert!(!result.is_bound());
        assert_eq!(result.clone().get(), Err(BindResultError::NotBound));
        assert_eq!(result.clone().or_else_get(|| 3), 3);
        assert_eq!(result.clone().or_else_try(|| Err::<i32, _>("failed")), Err("failed"));

        let mut called = false;
        result.if_bound(|_| called = true);
        assert!(!called);
    }
}
