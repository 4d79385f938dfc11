use crate::specification::Specification;
use std::fmt;
use std::sync::Arc;

/// 惰性查询描述
///
/// 仅记录谓词（规约的合取），不持有结果；交给仓储的 `fetch`/`first*`
/// 时才求值，可克隆并重复求值。
pub struct Query<T> {
    predicates: Vec<Arc<dyn Specification<T>>>,
}

impl<T> Query<T> {
    /// 匹配该类型的全部实体
    pub fn all() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    pub fn filter<S>(spec: S) -> Self
    where
        S: Specification<T> + 'static,
    {
        Self::all().and(spec)
    }

    /// 追加一个必须同时满足的规约
    pub fn and<S>(mut self, spec: S) -> Self
    where
        S: Specification<T> + 'static,
    {
        self.predicates.push(Arc::new(spec));
        self
    }

    pub fn matches(&self, candidate: &T) -> bool {
        self.predicates
            .iter()
            .all(|spec| spec.is_satisfied_by(candidate))
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("type", &std::any::type_name::<T>())
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::spec_fn;

    #[test]
    fn unfiltered_query_matches_everything() {
        let query = Query::<i32>::all();
        assert!(query.is_unfiltered());
        assert!(query.matches(&-1));
    }

    #[test]
    fn predicates_are_conjunctive_and_reusable() {
        let query = Query::filter(spec_fn(|n: &i32| *n > 0)).and(spec_fn(|n: &i32| *n < 10));
        let copy = query.clone();

        assert!(query.matches(&5));
        assert!(!query.matches(&12));
        assert!(!copy.matches(&0));
        assert!(copy.matches(&9));
    }
}
