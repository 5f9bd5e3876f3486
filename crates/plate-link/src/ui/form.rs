/// Headless model of the URL form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkFormState {
    pub url: String,
    pub save_enabled: bool,
}

/// Headless model of the quick actions surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkActionsState {
    pub href: Option<String>,
    pub unlink_enabled: bool,
}

/// A manual decorator switch as the form shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorSwitch {
    pub id: String,
    pub label: String,
    pub is_on: bool,
}
