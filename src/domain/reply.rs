//! 状态检查类调用的返回类型

/// 调用结果：成功拿到值，或者不可用
///
/// 网络错误、非 2xx、非 JSON 响应都折叠为 `Unavailable`，
/// 由调用方决定是继续轮询还是判定失败
#[derive(Clone, Debug, PartialEq)]
pub enum Reply<T> {
    Ok(T),
    Unavailable,
}

impl<T> Reply<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Reply::Unavailable)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Ok(value) => Reply::Ok(f(value)),
            Reply::Unavailable => Reply::Unavailable,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Reply::Ok(value) => Some(value),
            Reply::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Reply<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Reply::Ok(v),
            None => Reply::Unavailable,
        }
    }
}
