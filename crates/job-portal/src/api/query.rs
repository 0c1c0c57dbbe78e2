use crate::store::FilterCriteria;

/// Query string for `GET /job/get`, built from a filter snapshot.
///
/// `keyword` is always sent (possibly empty); every other parameter is left
/// out while it holds its default.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub keyword: String,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl From<&FilterCriteria> for JobQuery {
    fn from(criteria: &FilterCriteria) -> Self {
        Self {
            keyword: criteria.keyword.trim().to_string(),
            location: non_empty(&criteria.location),
            industry: non_empty(&criteria.industry),
            salary_min: (criteria.salary_min > 0.0).then_some(criteria.salary_min),
            salary_max: criteria
                .salary_max
                .is_finite()
                .then_some(criteria.salary_max),
        }
    }
}

impl JobQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("keyword", self.keyword.clone())];
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(industry) = &self.industry {
            pairs.push(("industry", industry.clone()));
        }
        if let Some(min) = self.salary_min {
            pairs.push(("salaryMin", min.to_string()));
        }
        if let Some(max) = self.salary_max {
            pairs.push(("salaryMax", max.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn criteria(location: &str, industry: &str, min: f64, max: f64) -> FilterCriteria {
        FilterCriteria {
            keyword: String::new(),
            location: location.to_string(),
            industry: industry.to_string(),
            salary_min: min,
            salary_max: max,
        }
    }

    fn keys(query: &JobQuery) -> Vec<&'static str> {
        query.pairs().into_iter().map(|(key, _)| key).collect()
    }

    #[test]
    fn location_only_filter_omits_defaults() {
        let query = JobQuery::from(&criteria("bangalore", "", 0.0, f64::INFINITY));
        assert_eq!(
            query.pairs(),
            vec![
                ("keyword", String::new()),
                ("location", "bangalore".to_string())
            ]
        );
    }

    #[rstest]
    #[case::defaults(criteria("", "", 0.0, f64::INFINITY), vec!["keyword"])]
    #[case::industry(criteria("", "Data Science", 0.0, f64::INFINITY), vec!["keyword", "industry"])]
    #[case::min_only(criteria("", "", 5.0, f64::INFINITY), vec!["keyword", "salaryMin"])]
    #[case::max_only(criteria("", "", 0.0, 20.0), vec!["keyword", "salaryMax"])]
    #[case::everything(
        criteria("pune", "DevOps Engineer", 5.0, 20.0),
        vec!["keyword", "location", "industry", "salaryMin", "salaryMax"]
    )]
    fn includes_only_non_default_parameters(
        #[case] filters: FilterCriteria,
        #[case] expected: Vec<&'static str>,
    ) {
        assert_eq!(keys(&JobQuery::from(&filters)), expected);
    }

    #[test]
    fn salary_values_render_without_trailing_zeros() {
        let query = JobQuery::from(&criteria("", "", 4.0, 12.5));
        let pairs = query.pairs();
        assert!(pairs.contains(&("salaryMin", "4".to_string())));
        assert!(pairs.contains(&("salaryMax", "12.5".to_string())));
    }
}
