use crate::extract::{FieldOutcome, FieldSource};
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::{Element, Tab};

/// Whether a lookup failed only because nothing matched the selector
pub(crate) fn is_no_match(err: &anyhow::Error) -> bool {
    err.is::<NoElementFound>()
}

fn lookup_failed(selector: &str, err: anyhow::Error) -> FieldOutcome {
    if is_no_match(&err) {
        FieldOutcome::missing(selector)
    } else {
        FieldOutcome::failed(selector, err)
    }
}

/// Inner text of `element`, trimmed
fn read_text(selector: &str, element: &Element<'_>) -> FieldOutcome {
    match element.get_inner_text() {
        Ok(text) => FieldOutcome::Found(text.trim().to_string()),
        Err(e) => FieldOutcome::failed(selector, e),
    }
}

fn read_attribute(selector: &str, element: &Element<'_>, name: &str) -> FieldOutcome {
    match element.get_attribute_value(name) {
        Ok(Some(value)) => FieldOutcome::Found(value),
        Ok(None) => FieldOutcome::missing(selector),
        Err(e) => FieldOutcome::failed(selector, e),
    }
}

/// Lookups scoped to a single result item
impl FieldSource for Element<'_> {
    fn text(&self, selector: &str) -> FieldOutcome {
        match self.find_element(selector) {
            Ok(element) => read_text(selector, &element),
            Err(e) => lookup_failed(selector, e),
        }
    }

    fn attribute(&self, selector: &str, name: &str) -> FieldOutcome {
        match self.find_element(selector) {
            Ok(element) => read_attribute(selector, &element, name),
            Err(e) => lookup_failed(selector, e),
        }
    }
}

/// Lookups over the whole document of a tab
impl FieldSource for Tab {
    fn text(&self, selector: &str) -> FieldOutcome {
        match self.find_element(selector) {
            Ok(element) => read_text(selector, &element),
            Err(e) => lookup_failed(selector, e),
        }
    }

    fn attribute(&self, selector: &str, name: &str) -> FieldOutcome {
        match self.find_element(selector) {
            Ok(element) => read_attribute(selector, &element, name),
            Err(e) => lookup_failed(selector, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_missing() {
        let outcome = lookup_failed(".tx_brand", anyhow::Error::new(NoElementFound {}));
        assert_eq!(outcome, FieldOutcome::missing(".tx_brand"));
    }

    #[test]
    fn test_transport_error_is_failure() {
        let err = anyhow::anyhow!("Unable to make method calls because underlying connection is closed");
        assert!(!is_no_match(&err));
        assert!(matches!(lookup_failed(".tx_brand", err), FieldOutcome::Failed { .. }));
    }
}
