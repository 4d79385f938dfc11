use std::marker::PhantomData;

/// 规约模式的核心 trait
///
/// 用于封装查询条件，使其可复用、可组合和可测试；
/// 聚合存储的 `filter` 与 CRUD 仓储的查询都以规约描述谓词。
pub trait Specification<T>: Send + Sync {
    /// 检查候选对象是否满足规约
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// 与另一个规约进行 AND 组合
    fn and<S>(self, other: S) -> AndSpecification<T>
    where
        Self: Sized + 'static,
        S: Specification<T> + 'static,
    {
        AndSpecification::new(Box::new(self), Box::new(other))
    }

    /// 与另一个规约进行 OR 组合
    fn or<S>(self, other: S) -> OrSpecification<T>
    where
        Self: Sized + 'static,
        S: Specification<T> + 'static,
    {
        OrSpecification::new(Box::new(self), Box::new(other))
    }

    /// 对规约进行 NOT 操作
    fn not(self) -> NotSpecification<T>
    where
        Self: Sized + 'static,
    {
        NotSpecification::new(Box::new(self))
    }
}

pub type BoxSpecification<T> = Box<dyn Specification<T>>;

impl<T> Specification<T> for Box<dyn Specification<T>> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.as_ref().is_satisfied_by(candidate)
    }
}

/// 以闭包表达的规约
pub struct FnSpecification<T, F> {
    predicate: F,
    _marker: PhantomData<fn(&T) -> bool>,
}

impl<T, F> Specification<T> for FnSpecification<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }
}

/// 从闭包创建规约
pub fn spec_fn<T, F>(predicate: F) -> FnSpecification<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    FnSpecification {
        predicate,
        _marker: PhantomData,
    }
}

/// AND 组合规约
pub struct AndSpecification<T> {
    left: BoxSpecification<T>,
    right: BoxSpecification<T>,
}

impl<T> AndSpecification<T> {
    pub fn new(left: BoxSpecification<T>, right: BoxSpecification<T>) -> Self {
        Self { left, right }
    }
}

impl<T> Specification<T> for AndSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) && self.right.is_satisfied_by(candidate)
    }
}

/// OR 组合规约
pub struct OrSpecification<T> {
    left: BoxSpecification<T>,
    right: BoxSpecification<T>,
}

impl<T> OrSpecification<T> {
    pub fn new(left: BoxSpecification<T>, right: BoxSpecification<T>) -> Self {
        Self { left, right }
    }
}

impl<T> Specification<T> for OrSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) || self.right.is_satisfied_by(candidate)
    }
}

/// NOT 规约
pub struct NotSpecification<T> {
    inner: BoxSpecification<T>,
}

impl<T> NotSpecification<T> {
    pub fn new(inner: BoxSpecification<T>) -> Self {
        Self { inner }
    }
}

impl<T> Specification<T> for NotSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.inner.is_satisfied_by(candidate)
    }
}
