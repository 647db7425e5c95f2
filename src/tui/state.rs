use crate::model::{Locale, Product};
use crate::orchestrator::{reduce, AppState, Intent, ProductField, Snapshot, StagedProduct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
}

impl LoginForm {
    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }
}

/// One focusable line of the product dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Field(ProductField),
    Image(usize),
}

pub fn form_rows(staged: &StagedProduct) -> Vec<FormRow> {
    let mut rows: Vec<FormRow> = ProductField::ALL.iter().copied().map(FormRow::Field).collect();
    rows.extend((0..staged.images_url.len()).map(FormRow::Image));
    rows
}

pub fn field_label(field: ProductField, locale: Locale) -> &'static str {
    match (locale, field) {
        (Locale::ZhTw, ProductField::Title) => "標題",
        (Locale::ZhTw, ProductField::Category) => "分類",
        (Locale::ZhTw, ProductField::OriginPrice) => "原價",
        (Locale::ZhTw, ProductField::Price) => "售價",
        (Locale::ZhTw, ProductField::Unit) => "單位",
        (Locale::ZhTw, ProductField::Description) => "產品描述",
        (Locale::ZhTw, ProductField::Content) => "說明內容",
        (Locale::ZhTw, ProductField::IsEnabled) => "是否啟用",
        (Locale::ZhTw, ProductField::ImageUrl) => "主圖網址",
        (Locale::En, ProductField::Title) => "Title",
        (Locale::En, ProductField::Category) => "Category",
        (Locale::En, ProductField::OriginPrice) => "Origin price",
        (Locale::En, ProductField::Price) => "Price",
        (Locale::En, ProductField::Unit) => "Unit",
        (Locale::En, ProductField::Description) => "Description",
        (Locale::En, ProductField::Content) => "Content",
        (Locale::En, ProductField::IsEnabled) => "Enabled",
        (Locale::En, ProductField::ImageUrl) => "Main image",
    }
}

pub struct UiState {
    /// Local copy of the controller state.
    pub app: AppState,
    /// Intents sent to the controller so far.
    pub sent: u64,
    pub locale: Locale,
    pub login: LoginForm,
    pub selected: usize,
    pub form_focus: usize,
    pub show_help: bool,
    /// Page number being typed after `g`.
    pub page_input: Option<String>,
}

impl UiState {
    pub fn new(locale: Locale) -> Self {
        Self {
            app: AppState::default(),
            sent: 0,
            locale,
            login: LoginForm::default(),
            selected: 0,
            form_focus: 0,
            show_help: false,
            page_input: None,
        }
    }

    /// Record an intent on its way to the controller.
    ///
    /// The reducer is pure, so running it on the local copy keeps form edits visible
    /// immediately; requests still only happen in the controller.
    pub fn record(&mut self, intent: &Intent) {
        let _ = reduce(&mut self.app, intent.clone());
        self.sent += 1;
        self.clamp();
    }

    /// Take a controller snapshot unless intents we already sent are still queued.
    pub fn apply_snapshot(&mut self, snap: Snapshot) {
        if snap.handled < self.sent {
            return;
        }
        let was_authenticated = self.app.authenticated;
        self.app = snap.state;
        if self.app.authenticated && !was_authenticated {
            self.login.password.clear();
        }
        self.clamp();
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.app.products.get(self.selected)
    }

    pub fn focused_row(&self) -> Option<FormRow> {
        form_rows(&self.app.staged).get(self.form_focus).copied()
    }

    pub fn move_form_focus(&mut self, forward: bool) {
        let n = form_rows(&self.app.staged).len();
        if n == 0 {
            return;
        }
        self.form_focus = if forward {
            (self.form_focus + 1) % n
        } else {
            (self.form_focus + n - 1) % n
        };
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.app.products.len().saturating_sub(1));
        let rows = form_rows(&self.app.staged).len();
        self.form_focus = self.form_focus.min(rows.saturating_sub(1));
    }
}
