use serde::Serialize;
use tracing::debug;

use super::domain::CategoryGroup;

/// Known subcategory labels and the group each belongs to.
const SUBCATEGORY_GROUPS: [(&str, CategoryGroup); 13] = [
    (
        "Carbon pricing and reporting obligations",
        CategoryGroup::PolicyLegal,
    ),
    (
        "Mandates on and regulation of existing products and services",
        CategoryGroup::PolicyLegal,
    ),
    ("Exposure to litigation", CategoryGroup::PolicyLegal),
    (
        "Substitution of existing products and services",
        CategoryGroup::Technology,
    ),
    (
        "Unsuccessful investment in new technologies",
        CategoryGroup::Technology,
    ),
    ("Changing customer behavior", CategoryGroup::Market),
    ("Increased cost of raw materials", CategoryGroup::Market),
    ("Uncertainty in market signals", CategoryGroup::Market),
    ("Shift in consumer preferences", CategoryGroup::Reputation),
    ("Stigmatization of sector", CategoryGroup::Reputation),
    (
        "Increased shareholder concern/negative feedback",
        CategoryGroup::Reputation,
    ),
    ("Acute", CategoryGroup::Physical),
    ("Chronic", CategoryGroup::Physical),
];

/// Subcategory keyword families, checked in order.
const KEYWORD_FAMILIES: [(CategoryGroup, &[&str]); 4] = [
    (
        CategoryGroup::PolicyLegal,
        &["carbon", "regulation", "litigation", "policy"],
    ),
    (
        CategoryGroup::Technology,
        &["technology", "substitution", "investment"],
    ),
    (
        CategoryGroup::Market,
        &["market", "customer", "raw material", "cost"],
    ),
    (
        CategoryGroup::Reputation,
        &["reputation", "consumer", "shareholder", "stigma"],
    ),
];

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRoute {
    /// The category label already named a canonical group.
    Canonical,
    /// The subcategory appears in the static subcategory table.
    SubcategoryTable,
    /// The category label mentions "physical" or "opportunity".
    CategoryKeyword,
    /// A keyword family matched the subcategory text.
    SubcategoryKeyword,
    /// Nothing matched.
    Fallback,
}

impl ClassificationRoute {
    pub const fn is_heuristic(self) -> bool {
        !matches!(
            self,
            ClassificationRoute::Canonical | ClassificationRoute::SubcategoryTable
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub group: CategoryGroup,
    pub route: ClassificationRoute,
}

/// Maps loosely-typed category labels (framework names, generated headings)
/// onto the canonical [`CategoryGroup`] taxonomy. Total and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryClassifier;

impl CategoryClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, category_label: &str, subcategory_label: &str) -> CategoryGroup {
        self.explain(category_label, subcategory_label).group
    }

    /// Classify and report the rule that fired. Heuristic routes are logged.
    pub fn explain(&self, category_label: &str, subcategory_label: &str) -> Classification {
        let classification = classify_labels(category_label, subcategory_label);
        if classification.route.is_heuristic() {
            debug!(
                category = category_label,
                subcategory = subcategory_label,
                group = %classification.group,
                route = ?classification.route,
                "heuristic category classification"
            );
        }
        classification
    }
}

fn classify_labels(category_label: &str, subcategory_label: &str) -> Classification {
    if let Some(group) = CategoryGroup::from_label(category_label) {
        return Classification {
            group,
            route: ClassificationRoute::Canonical,
        };
    }

    if let Some((_, group)) = SUBCATEGORY_GROUPS
        .iter()
        .find(|(label, _)| *label == subcategory_label)
    {
        return Classification {
            group: *group,
            route: ClassificationRoute::SubcategoryTable,
        };
    }

    let category = category_label.to_lowercase();
    if category.contains("physical") {
        return Classification {
            group: CategoryGroup::Physical,
            route: ClassificationRoute::CategoryKeyword,
        };
    }
    if category.contains("opportunity") {
        return Classification {
            group: CategoryGroup::Opportunity,
            route: ClassificationRoute::CategoryKeyword,
        };
    }

    let subcategory = subcategory_label.to_lowercase();
    KEYWORD_FAMILIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| subcategory.contains(keyword)))
        .map(|(group, _)| Classification {
            group: *group,
            route: ClassificationRoute::SubcategoryKeyword,
        })
        .unwrap_or(Classification {
            group: CategoryGroup::PolicyLegal,
            route: ClassificationRoute::Fallback,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(category: &str, subcategory: &str) -> Classification {
        CategoryClassifier::new().explain(category, subcategory)
    }

    #[test]
    fn canonical_labels_pass_through() {
        for group in CategoryGroup::ALL {
            let result = classify(group.label(), "anything at all");
            assert_eq!(result.group, group);
            assert_eq!(result.route, ClassificationRoute::Canonical);
        }
    }

    #[test]
    fn known_subcategory_wins_over_category_keywords() {
        let result = classify("Physical Risk - Acute", "Exposure to litigation");
        assert_eq!(result.group, CategoryGroup::PolicyLegal);
        assert_eq!(result.route, ClassificationRoute::SubcategoryTable);
    }

    #[test]
    fn category_keywords_detect_physical_and_opportunity() {
        assert_eq!(
            classify("Physical Risk - Chronic", "Sea level rise").group,
            CategoryGroup::Physical
        );
        assert_eq!(
            classify("Opportunity - Energy Source", "Green hydrogen").group,
            CategoryGroup::Opportunity
        );
        assert_eq!(
            classify("opportunity", "Waste reduction").route,
            ClassificationRoute::CategoryKeyword
        );
    }

    #[test]
    fn subcategory_keyword_families_apply_in_order() {
        assert_eq!(
            classify("transition", "Carbon border adjustments").group,
            CategoryGroup::PolicyLegal
        );
        assert_eq!(
            classify("transition", "Stranded investment in legacy plants").group,
            CategoryGroup::Technology
        );
        assert_eq!(
            classify("transition", "Rising input cost").group,
            CategoryGroup::Market
        );
        assert_eq!(
            classify("transition", "Shareholder activism").group,
            CategoryGroup::Reputation
        );
        // "carbon" (policy) is checked before "cost" (market)
        assert_eq!(
            classify("transition", "Cost of carbon credits").group,
            CategoryGroup::PolicyLegal
        );
    }

    #[test]
    fn unmatched_labels_fall_back_to_policy_legal() {
        let result = classify("NotACategory", "");
        assert_eq!(result.group, CategoryGroup::PolicyLegal);
        assert_eq!(result.route, ClassificationRoute::Fallback);
    }

    #[test]
    fn canonical_match_is_case_sensitive() {
        let result = classify("market", "Something unrelated");
        assert_eq!(result.route, ClassificationRoute::Fallback);
    }
}
