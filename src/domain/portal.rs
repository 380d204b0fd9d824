/// Billing portal configuration derived from site settings. Built fresh per
/// reconciliation attempt — the headline must track the current site title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalBusinessProfile {
    headline: String,
}

impl PortalBusinessProfile {
    pub fn from_site_title(site_title: &str) -> Self {
        Self {
            headline: format!("Manage your {site_title} subscription"),
        }
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    /// Form-encoded parameters for the Stripe REST API.
    pub fn to_form(&self) -> Vec<(String, String)> {
        vec![(
            "business_profile[headline]".to_string(),
            self.headline.clone(),
        )]
    }
}

/// Full variant — used on create. Updates send the business profile alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfigurationOptions {
    profile: PortalBusinessProfile,
    return_url: String,
}

impl PortalConfigurationOptions {
    pub fn new(site_title: &str, site_url: &str) -> Self {
        Self {
            profile: PortalBusinessProfile::from_site_title(site_title),
            return_url: site_url.to_string(),
        }
    }

    pub fn profile(&self) -> &PortalBusinessProfile {
        &self.profile
    }

    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut params = self.profile.to_form();
        params.push((
            "features[payment_method_update][enabled]".to_string(),
            "true".to_string(),
        ));
        params.push((
            "features[invoice_history][enabled]".to_string(),
            "true".to_string(),
        ));
        params.push((
            "features[subscription_cancel][enabled]".to_string(),
            "true".to_string(),
        ));
        params.push(("default_return_url".to_string(), self.return_url.clone()));
        params
    }
}
