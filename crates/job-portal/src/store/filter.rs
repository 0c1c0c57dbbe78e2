use tokio::sync::watch;

use super::Store;

/// Browse-view filters. Transient; reset when the browse view goes away.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub keyword: String,
    pub location: String,
    pub industry: String,
    pub salary_min: f64,
    /// `f64::INFINITY` means no upper bound.
    pub salary_max: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            location: String::new(),
            industry: String::new(),
            salary_min: 0.0,
            salary_max: f64::INFINITY,
        }
    }
}

/// Selector value meaning "no filter".
const ALL_OPTION: &str = "all";

fn selector_value(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case(ALL_OPTION) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn sanitize_min(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

fn sanitize_max(value: f64) -> f64 {
    if value.is_nan() || value <= 0.0 {
        f64::INFINITY
    } else {
        value
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl FilterCriteria {
    pub fn set_keyword(&mut self, keyword: &str) -> bool {
        replace(&mut self.keyword, keyword.to_string())
    }

    pub fn set_location(&mut self, location: &str) -> bool {
        replace(&mut self.location, selector_value(location))
    }

    pub fn set_industry(&mut self, industry: &str) -> bool {
        replace(&mut self.industry, selector_value(industry))
    }

    /// `max >= min` is not enforced; an inverted range simply matches nothing server-side.
    pub fn set_salary_range(&mut self, min: f64, max: f64) -> bool {
        let min_changed = replace(&mut self.salary_min, sanitize_min(min));
        let max_changed = replace(&mut self.salary_max, sanitize_max(max));
        min_changed || max_changed
    }

    pub fn reset(&mut self) -> bool {
        replace(self, Self::default())
    }

    /// Clear every refinement but keep the search keyword.
    pub fn clear_refinements(&mut self) -> bool {
        let cleared = Self {
            keyword: self.keyword.clone(),
            ..Self::default()
        };
        replace(self, cleared)
    }

    pub fn has_salary_bounds(&self) -> bool {
        self.salary_min > 0.0 || self.salary_max.is_finite()
    }
}

/// Holds the current [`FilterCriteria`]. Writing an unchanged value does not
/// wake subscribers.
#[derive(Debug)]
pub struct FilterStore {
    inner: Store<FilterCriteria>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self {
            inner: Store::new(FilterCriteria::default()),
        }
    }
}

impl FilterStore {
    pub fn snapshot(&self) -> FilterCriteria {
        self.inner.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterCriteria> {
        self.inner.subscribe()
    }

    pub fn set_keyword(&self, keyword: &str) -> bool {
        self.inner.update_if(|criteria| criteria.set_keyword(keyword))
    }

    pub fn set_location(&self, location: &str) -> bool {
        self.inner.update_if(|criteria| criteria.set_location(location))
    }

    pub fn set_industry(&self, industry: &str) -> bool {
        self.inner.update_if(|criteria| criteria.set_industry(industry))
    }

    pub fn set_salary_range(&self, min: f64, max: f64) -> bool {
        self.inner
            .update_if(|criteria| criteria.set_salary_range(min, max))
    }

    pub fn reset(&self) -> bool {
        self.inner.update_if(FilterCriteria::reset)
    }

    pub fn clear_refinements(&self) -> bool {
        self.inner.update_if(FilterCriteria::clear_refinements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_open_filters() {
        let store = FilterStore::default();
        store.set_keyword("rust");
        store.set_location("Pune");
        store.set_industry("Data Science");
        store.set_salary_range(5.0, 20.0);

        assert!(store.reset());
        assert_eq!(store.snapshot(), FilterCriteria::default());
        assert_eq!(store.snapshot().salary_max, f64::INFINITY);
    }

    #[test]
    fn all_option_clears_selectors() {
        let mut criteria = FilterCriteria::default();
        criteria.set_location("bangalore");
        criteria.set_industry("DevOps Engineer");
        criteria.set_location("All");
        criteria.set_industry("all");
        assert_eq!(criteria.location, "");
        assert_eq!(criteria.industry, "");
    }

    #[test]
    fn salary_inputs_are_sanitized_but_not_ordered() {
        let mut criteria = FilterCriteria::default();
        criteria.set_salary_range(-4.0, f64::NAN);
        assert_eq!(criteria.salary_min, 0.0);
        assert_eq!(criteria.salary_max, f64::INFINITY);
        assert!(!criteria.has_salary_bounds());

        criteria.set_salary_range(30.0, 10.0);
        assert_eq!(criteria.salary_min, 30.0);
        assert_eq!(criteria.salary_max, 10.0);
        assert!(criteria.has_salary_bounds());
    }

    #[test]
    fn clear_refinements_keeps_keyword() {
        let mut criteria = FilterCriteria::default();
        criteria.set_keyword("backend");
        criteria.set_location("mumbai");
        criteria.set_salary_range(3.0, 9.0);

        assert!(criteria.clear_refinements());
        assert_eq!(criteria.keyword, "backend");
        assert_eq!(criteria.location, "");
        assert!(!criteria.has_salary_bounds());
    }

    #[test]
    fn unchanged_writes_do_not_notify() {
        let store = FilterStore::default();
        let mut receiver = store.subscribe();
        receiver.borrow_and_update();

        assert!(!store.set_location(""));
        assert!(!store.reset());
        assert!(!receiver.has_changed().expect("store alive"));

        assert!(store.set_location("hyderabad"));
        assert!(receiver.has_changed().expect("store alive"));
        assert_eq!(receiver.borrow_and_update().location, "hyderabad");
    }
}
