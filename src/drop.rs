/// Runs `f` when the returned guard goes out of scope, including during unwinding.
pub(crate) fn on_drop(f: impl FnOnce()) -> impl Drop {
    struct Dropper<F: FnOnce()>(Option<F>);
    impl<F: FnOnce()> Drop for Dropper<F> {
        fn drop(&mut self) {
            if let Some(f) = self.0.take() {
                f();
            }
        }
    }
    Dropper(Some(f))
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, panic};

    use super::*;

    #[test]
    fn runs_on_unwind() {
        let ran = Cell::new(false);
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = on_drop(|| ran.set(true));
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(ran.get());
    }
}
