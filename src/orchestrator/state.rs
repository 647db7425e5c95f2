//! Application state owned by the controller.

use crate::model::{Notice, PageInfo, Product};

/// Which modal is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    Closed,
    CreateEdit,
    Delete,
}

/// Everything the views render. Owned by the controller; views get copies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub authenticated: bool,
    pub products: Vec<Product>,
    pub page_info: PageInfo,
    pub modal: Modal,
    pub staged: StagedProduct,
    pub is_new: bool,
    pub notice: Option<Notice>,
    /// A request is in flight.
    pub busy: bool,
}

/// Editable product fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Title,
    Category,
    OriginPrice,
    Price,
    Unit,
    Description,
    Content,
    IsEnabled,
    ImageUrl,
}

impl ProductField {
    pub const ALL: [ProductField; 9] = [
        ProductField::Title,
        ProductField::Category,
        ProductField::OriginPrice,
        ProductField::Price,
        ProductField::Unit,
        ProductField::Description,
        ProductField::Content,
        ProductField::IsEnabled,
        ProductField::ImageUrl,
    ];

    pub fn is_checkbox(self) -> bool {
        matches!(self, ProductField::IsEnabled)
    }
}

/// Raw form input: checkboxes report a boolean, everything else the typed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Text(String),
    Checked(bool),
}

/// Working draft of the product being created or edited.
///
/// Prices are kept as the text the user typed and only become numbers on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedProduct {
    pub id: Option<String>,
    pub title: String,
    pub category: String,
    pub origin_price: String,
    pub price: String,
    pub unit: String,
    pub description: String,
    pub content: String,
    pub is_enabled: bool,
    pub image_url: String,
    pub images_url: Vec<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for StagedProduct {
    fn default() -> Self {
        Self::empty()
    }
}

impl StagedProduct {
    /// The blank template used when creating a product.
    pub fn empty() -> Self {
        Self {
            id: None,
            title: String::new(),
            category: String::new(),
            origin_price: "0".into(),
            price: "0".into(),
            unit: String::new(),
            description: String::new(),
            content: String::new(),
            is_enabled: true,
            image_url: String::new(),
            images_url: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn from_product(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            category: p.category.clone(),
            origin_price: p.origin_price.to_string(),
            price: p.price.to_string(),
            unit: p.unit.clone(),
            description: p.description.clone(),
            content: p.content.clone(),
            is_enabled: p.is_enabled,
            image_url: p.image_url.clone(),
            images_url: p.images_url.clone(),
            extra: p.extra.clone(),
        }
    }

    pub fn text(&self, field: ProductField) -> &str {
        match field {
            ProductField::Title => &self.title,
            ProductField::Category => &self.category,
            ProductField::OriginPrice => &self.origin_price,
            ProductField::Price => &self.price,
            ProductField::Unit => &self.unit,
            ProductField::Description => &self.description,
            ProductField::Content => &self.content,
            ProductField::ImageUrl => &self.image_url,
            ProductField::IsEnabled => "",
        }
    }

    /// Merge one form input into the draft. Inputs of the wrong kind for the field
    /// are ignored.
    pub fn apply(&mut self, field: ProductField, input: FieldInput) {
        match (field, input) {
            (ProductField::IsEnabled, FieldInput::Checked(on)) => self.is_enabled = on,
            (ProductField::IsEnabled, FieldInput::Text(_)) | (_, FieldInput::Checked(_)) => {}
            (ProductField::Title, FieldInput::Text(v)) => self.title = v,
            (ProductField::Category, FieldInput::Text(v)) => self.category = v,
            (ProductField::OriginPrice, FieldInput::Text(v)) => self.origin_price = v,
            (ProductField::Price, FieldInput::Text(v)) => self.price = v,
            (ProductField::Unit, FieldInput::Text(v)) => self.unit = v,
            (ProductField::Description, FieldInput::Text(v)) => self.description = v,
            (ProductField::Content, FieldInput::Text(v)) => self.content = v,
            (ProductField::ImageUrl, FieldInput::Text(v)) => self.image_url = v,
        }
    }

    /// Replace the secondary image at `index`. Indices past the end are ignored.
    pub fn set_image(&mut self, index: usize, url: String) {
        if let Some(slot) = self.images_url.get_mut(index) {
            *slot = url;
        }
    }

    pub fn add_image(&mut self) {
        self.images_url.push(String::new());
    }

    pub fn remove_image(&mut self) {
        self.images_url.pop();
    }

    /// Convert the draft into the product sent to the API, coercing prices to numbers.
    pub fn to_product(&self) -> Option<Product> {
        Some(Product {
            id: self.id.clone(),
            title: self.title.clone(),
            category: self.category.clone(),
            origin_price: coerce_number(&self.origin_price)?,
            price: coerce_number(&self.price)?,
            unit: self.unit.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            is_enabled: self.is_enabled,
            image_url: self.image_url.clone(),
            images_url: self.images_url.clone(),
            extra: self.extra.clone(),
        })
    }
}

/// Coerce form text to a number: blank is 0, anything else must parse to a finite value.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
