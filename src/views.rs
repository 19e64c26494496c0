use serde::{Deserialize, Serialize};

use crate::analysis::{
    self, age_histogram, categorical_distribution, hourly_activity, word_frequencies,
    AgeHistogram, Distribution, HourlyActivity,
};
use crate::dataset::{Column, Dataset};
use crate::error::Result;
use crate::wordcloud::{self, CloudLayout, LOGICAL_HEIGHT, LOGICAL_WIDTH};

/// The four dashboard pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    #[default]
    Distribution,
    Age,
    Intents,
    Activity,
}

impl View {
    pub const ALL: &[View] = &[View::Distribution, View::Age, View::Intents, View::Activity];

    pub fn name(&self) -> &'static str {
        match self {
            View::Distribution => "Categorical Variables Distributions",
            View::Age => "Age Distribution",
            View::Intents => "User Intents",
            View::Activity => "User Activity Trends",
        }
    }
}

/// A view together with every option it depends on. Equal requests over the
/// same dataset always produce equal output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewRequest {
    Distribution { column: Column },
    Age { bins: u8 },
    Intents { words: Vec<String>, max_words: u8 },
    Activity { group_by: Column },
}

impl ViewRequest {
    pub fn view(&self) -> View {
        match self {
            ViewRequest::Distribution { .. } => View::Distribution,
            ViewRequest::Age { .. } => View::Age,
            ViewRequest::Intents { .. } => View::Intents,
            ViewRequest::Activity { .. } => View::Activity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    Distribution { column: Column, result: Distribution },
    /// `None` when no record carries an age.
    Age(Option<AgeHistogram>),
    Intents {
        frequencies: Vec<(String, usize)>,
        cloud: CloudLayout,
    },
    Activity { group_by: Column, activity: HourlyActivity },
}

/// Run the computation behind one request.
pub fn compute(ds: &Dataset, request: &ViewRequest) -> Result<ViewOutput> {
    let output = match request {
        ViewRequest::Distribution { column } => ViewOutput::Distribution {
            column: *column,
            result: categorical_distribution(ds, *column),
        },
        ViewRequest::Age { bins } => ViewOutput::Age(age_histogram(ds, *bins as usize)),
        ViewRequest::Intents { words, max_words } => {
            let corpus = analysis::corpus(ds);
            let frequencies = word_frequencies(&corpus, words);
            let cloud = wordcloud::layout(&frequencies, *max_words as usize, LOGICAL_WIDTH, LOGICAL_HEIGHT);
            ViewOutput::Intents { frequencies, cloud }
        }
        ViewRequest::Activity { group_by } => ViewOutput::Activity {
            group_by: *group_by,
            activity: hourly_activity(ds, *group_by)?,
        },
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Profile;

    fn sample() -> Dataset {
        let mk = |sex: &str, orientation: &str, stamp: &str, essay: &str| Profile {
            age: Some(30.0),
            sex: Some(sex.into()),
            orientation: Some(orientation.into()),
            last_online: stamp.into(),
            essays: std::array::from_fn(|i| (i == 0).then(|| essay.to_string())),
            ..Default::default()
        };
        Dataset::new(vec![
            mk("m", "straight", "2012-06-10-00-01", "kind and fun"),
            mk("f", "straight", "2012-06-10-23-01", "kindness"),
            mk("m", "gay", "2012-06-10-23-02", "love"),
            mk("f", "gay", "2012-06-10-12-03", "funny"),
        ])
    }

    #[test]
    fn test_dispatch_matches_view() {
        let ds = sample();
        let requests = [
            ViewRequest::Distribution { column: Column::Orientation },
            ViewRequest::Age { bins: 40 },
            ViewRequest::Intents { words: vec!["kind".into()], max_words: 11 },
            ViewRequest::Activity { group_by: Column::Sex },
        ];
        for (req, view) in requests.iter().zip(View::ALL) {
            assert_eq!(req.view(), *view);
            assert!(compute(&ds, req).is_ok());
        }
    }

    #[test]
    fn test_intents_counts_substrings() {
        let ds = sample();
        let req = ViewRequest::Intents {
            words: vec!["kind".into(), "fun".into(), "hook".into()],
            max_words: 11,
        };
        let ViewOutput::Intents { frequencies, cloud } = compute(&ds, &req).unwrap() else {
            panic!("expected intents output");
        };
        assert_eq!(frequencies[0], ("kind".to_string(), 2));
        assert_eq!(frequencies[1], ("fun".to_string(), 2));
        assert_eq!(frequencies[2], ("hook".to_string(), 0));
        assert_eq!(cloud.words.len(), 2);
    }

    #[test]
    fn test_activity_error_propagates() {
        let mut profiles = sample().profiles().to_vec();
        profiles[2].last_online = "2012-06".into();
        let ds = Dataset::new(profiles);
        assert!(compute(&ds, &ViewRequest::Activity { group_by: Column::Orientation }).is_err());
    }

    #[test]
    fn test_view_names() {
        assert_eq!(View::Age.name(), "Age Distribution");
        assert_eq!(View::default(), View::Distribution);
    }
}
