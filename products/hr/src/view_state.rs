/// Lifecycle of a view's remote data.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Loading
    }
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Success(data) => ViewState::Success(f(data)),
            ViewState::Error(message) => ViewState::Error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let state: ViewState<u8> = ViewState::default();
        assert!(state.is_loading());
        let state = ViewState::Success(2).map(|n| n * 2);
        assert_eq!(state.data(), Some(&4));
        let state: ViewState<u8> = ViewState::Error("boom".into());
        assert_eq!(state.error(), Some("boom"));
        assert_eq!(state.data(), None);
    }
}
