//! Pure state transitions.
//!
//! `reduce` handles user intents, `apply_outcome` handles finished requests. Both may
//! ask for network work by returning an `Effect`; the controller performs it and feeds
//! the `Outcome` back in.

use super::state::{AppState, FieldInput, Modal, ProductField, StagedProduct};
use crate::api::ApiError;
use crate::model::{Credentials, Notice, Product, ProductPage};
use tracing::{debug, info, warn};

/// User actions forwarded by views.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Pick up a stored session on startup.
    Restore,
    Login(Credentials),
    Logout,
    FetchPage(u32),
    OpenCreate,
    OpenEdit(Product),
    OpenDelete(Product),
    CloseModal,
    EditField {
        field: ProductField,
        input: FieldInput,
    },
    SetImage {
        index: usize,
        url: String,
    },
    AddImage,
    RemoveImage,
    Submit,
    ConfirmDelete,
    DismissNotice,
}

/// Network work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RestoreSession,
    SignIn(Credentials),
    ForgetSession,
    FetchProducts { page: u32 },
    CreateProduct(Product),
    UpdateProduct { id: String, product: Product },
    DeleteProduct { id: String },
}

/// Result of performing an `Effect`.
#[derive(Debug)]
pub enum Outcome {
    NoStoredSession,
    SessionChecked(Result<(), ApiError>),
    SignedIn(Result<(), ApiError>),
    SessionForgotten,
    ProductsFetched(Result<ProductPage, ApiError>),
    ProductSaved {
        created: bool,
        result: Result<(), ApiError>,
    },
    ProductDeleted(Result<(), ApiError>),
}

/// Apply a user intent. An intent that starts a request clears the previous notice, so
/// the notice on screen always belongs to the latest request.
pub fn reduce(state: &mut AppState, intent: Intent) -> Option<Effect> {
    let effect = transition(state, intent);
    if effect.is_some() {
        state.notice = None;
    }
    effect
}

fn transition(state: &mut AppState, intent: Intent) -> Option<Effect> {
    match intent {
        Intent::Restore => Some(Effect::RestoreSession),
        Intent::Login(credentials) => Some(Effect::SignIn(credentials)),
        Intent::Logout => Some(Effect::ForgetSession),
        Intent::FetchPage(page) => Some(Effect::FetchProducts { page: page.max(1) }),
        Intent::OpenCreate => {
            state.staged = StagedProduct::empty();
            state.is_new = true;
            state.modal = Modal::CreateEdit;
            None
        }
        Intent::OpenEdit(product) => {
            state.staged = StagedProduct::from_product(&product);
            state.is_new = false;
            state.modal = Modal::CreateEdit;
            None
        }
        Intent::OpenDelete(product) => {
            state.staged = StagedProduct::from_product(&product);
            state.modal = Modal::Delete;
            None
        }
        Intent::CloseModal => {
            state.modal = Modal::Closed;
            None
        }
        Intent::EditField { field, input } => {
            state.staged.apply(field, input);
            None
        }
        Intent::SetImage { index, url } => {
            state.staged.set_image(index, url);
            None
        }
        Intent::AddImage => {
            state.staged.add_image();
            None
        }
        Intent::RemoveImage => {
            state.staged.remove_image();
            None
        }
        Intent::Submit => submit(state),
        Intent::ConfirmDelete => {
            if state.modal != Modal::Delete {
                debug!("delete confirmation ignored: dialog not open");
                return None;
            }
            match state.staged.id.clone() {
                Some(id) => Some(Effect::DeleteProduct { id }),
                None => {
                    state.notice = Some(Notice::DeleteFailed);
                    None
                }
            }
        }
        Intent::DismissNotice => {
            state.notice = None;
            None
        }
    }
}

fn submit(state: &mut AppState) -> Option<Effect> {
    // Once a submit succeeds the dialog closes, so a repeated submit is dropped here.
    if state.modal != Modal::CreateEdit {
        debug!("submit ignored: product dialog not open");
        return None;
    }
    let Some(product) = state.staged.to_product() else {
        warn!("submit rejected: price is not a number");
        state.notice = Some(Notice::SaveFailed);
        return None;
    };
    if state.is_new {
        return Some(Effect::CreateProduct(product));
    }
    match product.id.clone() {
        Some(id) => Some(Effect::UpdateProduct { id, product }),
        None => {
            warn!("submit rejected: edited product has no id");
            state.notice = Some(Notice::SaveFailed);
            None
        }
    }
}

pub fn apply_outcome(state: &mut AppState, outcome: Outcome) -> Option<Effect> {
    match outcome {
        Outcome::NoStoredSession => {
            state.authenticated = false;
            None
        }
        Outcome::SessionChecked(Ok(())) | Outcome::SignedIn(Ok(())) => {
            info!("session authenticated");
            state.authenticated = true;
            Some(Effect::FetchProducts { page: 1 })
        }
        Outcome::SessionChecked(Err(e)) => {
            // A stale stored token just means the login form is shown; no notice.
            info!(error = %e, "stored session rejected");
            state.authenticated = false;
            None
        }
        Outcome::SignedIn(Err(e)) => {
            warn!(error = %e, "sign-in failed");
            state.notice = Some(Notice::LoginFailed);
            None
        }
        Outcome::SessionForgotten => {
            *state = AppState {
                notice: Some(Notice::LoggedOut),
                ..AppState::default()
            };
            None
        }
        Outcome::ProductsFetched(Ok(page)) => {
            debug!(
                count = page.products.len(),
                page = page.pagination.current_page,
                "product page loaded"
            );
            state.products = page.products;
            state.page_info = page.pagination;
            if state.notice == Some(Notice::FetchFailed) {
                state.notice = None;
            }
            None
        }
        Outcome::ProductsFetched(Err(e)) => {
            warn!(error = %e, "failed to load products");
            state.notice = Some(Notice::FetchFailed);
            None
        }
        Outcome::ProductSaved { created, result } => match result {
            Ok(()) => {
                state.notice = Some(if created {
                    Notice::Created
                } else {
                    Notice::Updated
                });
                state.modal = Modal::Closed;
                Some(Effect::FetchProducts {
                    page: state.page_info.refresh_page(),
                })
            }
            Err(e) => {
                warn!(error = %e, created, "failed to save product");
                state.notice = Some(Notice::SaveFailed);
                None
            }
        },
        Outcome::ProductDeleted(result) => match result {
            Ok(()) => {
                state.notice = Some(Notice::Deleted);
                state.modal = Modal::Closed;
                Some(Effect::FetchProducts {
                    page: state.page_info.refresh_page(),
                })
            }
            Err(e) => {
                warn!(error = %e, "failed to delete product");
                state.notice = Some(Notice::DeleteFailed);
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageInfo;

    fn product(id: &str) -> Product {
        Product {
            id: Some(id.into()),
            title: format!("product {id}"),
            price: 10.0,
            origin_price: 20.0,
            is_enabled: true,
            images_url: vec!["a".into()],
            ..Default::default()
        }
    }

    fn rejected() -> ApiError {
        ApiError::Rejected("nope".into())
    }

    #[test]
    fn open_create_resets_any_prior_draft() {
        let mut state = AppState::default();
        reduce(&mut state, Intent::OpenEdit(product("x")));
        reduce(
            &mut state,
            Intent::EditField {
                field: ProductField::Title,
                input: FieldInput::Text("changed".into()),
            },
        );

        assert_eq!(reduce(&mut state, Intent::OpenCreate), None);
        assert_eq!(state.staged, StagedProduct::empty());
        assert!(state.is_new);
        assert_eq!(state.modal, Modal::CreateEdit);
    }

    #[test]
    fn editing_staged_copy_leaves_list_untouched() {
        let p = product("x");
        let mut state = AppState {
            products: vec![p.clone()],
            ..Default::default()
        };
        let listed = state.products[0].clone();
        reduce(&mut state, Intent::OpenEdit(listed));
        assert_eq!(state.staged.to_product(), Some(p.clone()));
        assert!(!state.is_new);

        reduce(
            &mut state,
            Intent::EditField {
                field: ProductField::Title,
                input: FieldInput::Text("renamed".into()),
            },
        );
        reduce(&mut state, Intent::AddImage);
        assert_eq!(state.products[0], p);
        assert_eq!(state.staged.title, "renamed");
    }

    #[test]
    fn submit_picks_create_or_update() {
        let mut state = AppState::default();
        reduce(&mut state, Intent::OpenCreate);
        reduce(
            &mut state,
            Intent::EditField {
                field: ProductField::Price,
                input: FieldInput::Text("15".into()),
            },
        );
        match reduce(&mut state, Intent::Submit) {
            Some(Effect::CreateProduct(p)) => assert_eq!(p.price, 15.0),
            other => panic!("unexpected effect: {other:?}"),
        }

        reduce(&mut state, Intent::OpenEdit(product("x")));
        match reduce(&mut state, Intent::Submit) {
            Some(Effect::UpdateProduct { id, product }) => {
                assert_eq!(id, "x");
                assert_eq!(product.origin_price, 20.0);
            }
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn submit_with_bad_price_fails_locally() {
        let mut state = AppState::default();
        reduce(&mut state, Intent::OpenCreate);
        reduce(
            &mut state,
            Intent::EditField {
                field: ProductField::OriginPrice,
                input: FieldInput::Text("twelve".into()),
            },
        );
        assert_eq!(reduce(&mut state, Intent::Submit), None);
        assert_eq!(state.notice, Some(Notice::SaveFailed));
        assert_eq!(state.modal, Modal::CreateEdit);
    }

    #[test]
    fn submit_and_confirm_need_their_dialog_open() {
        let mut state = AppState::default();
        assert_eq!(reduce(&mut state, Intent::Submit), None);
        assert_eq!(reduce(&mut state, Intent::ConfirmDelete), None);
        assert_eq!(state.notice, None);
    }

    #[test]
    fn save_success_closes_dialog_and_refetches_current_page() {
        let mut state = AppState {
            modal: Modal::CreateEdit,
            page_info: PageInfo {
                current_page: 3,
                total_pages: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let next = apply_outcome(
            &mut state,
            Outcome::ProductSaved {
                created: false,
                result: Ok(()),
            },
        );
        assert_eq!(next, Some(Effect::FetchProducts { page: 3 }));
        assert_eq!(state.modal, Modal::Closed);
        assert_eq!(state.notice, Some(Notice::Updated));
    }

    #[test]
    fn save_failure_keeps_dialog_open() {
        let mut state = AppState {
            modal: Modal::CreateEdit,
            ..Default::default()
        };
        let next = apply_outcome(
            &mut state,
            Outcome::ProductSaved {
                created: true,
                result: Err(rejected()),
            },
        );
        assert_eq!(next, None);
        assert_eq!(state.modal, Modal::CreateEdit);
        assert_eq!(state.notice, Some(Notice::SaveFailed));
    }

    #[test]
    fn fetch_failure_keeps_stale_list() {
        let mut state = AppState {
            products: vec![product("a")],
            page_info: PageInfo {
                current_page: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let before = (state.products.clone(), state.page_info.clone());
        apply_outcome(&mut state, Outcome::ProductsFetched(Err(rejected())));
        assert_eq!((state.products.clone(), state.page_info.clone()), before);
        assert_eq!(state.notice, Some(Notice::FetchFailed));
    }

    #[test]
    fn fetch_success_replaces_list_wholesale() {
        let mut state = AppState {
            products: vec![product("a"), product("b")],
            ..Default::default()
        };
        apply_outcome(
            &mut state,
            Outcome::ProductsFetched(Ok(ProductPage {
                products: vec![product("c")],
                pagination: PageInfo {
                    current_page: 2,
                    total_pages: 2,
                    ..Default::default()
                },
            })),
        );
        assert_eq!(state.products, vec![product("c")]);
        assert_eq!(state.page_info.current_page, 2);
    }

    #[test]
    fn login_failure_does_not_fetch() {
        let mut state = AppState::default();
        let next = apply_outcome(&mut state, Outcome::SignedIn(Err(rejected())));
        assert_eq!(next, None);
        assert!(!state.authenticated);
        assert_eq!(state.notice, Some(Notice::LoginFailed));
    }

    #[test]
    fn logout_clears_everything_but_the_notice() {
        let mut state = AppState {
            authenticated: true,
            products: vec![product("a")],
            modal: Modal::Delete,
            ..Default::default()
        };
        apply_outcome(&mut state, Outcome::SessionForgotten);
        assert!(!state.authenticated);
        assert!(state.products.is_empty());
        assert_eq!(state.modal, Modal::Closed);
        assert_eq!(state.notice, Some(Notice::LoggedOut));
    }

    #[test]
    fn new_request_clears_previous_notice() {
        let mut state = AppState {
            authenticated: true,
            notice: Some(Notice::FetchFailed),
            ..Default::default()
        };
        assert_eq!(
            reduce(&mut state, Intent::FetchPage(2)),
            Some(Effect::FetchProducts { page: 2 })
        );
        assert_eq!(state.notice, None);

        // Local edits leave the notice alone.
        state.notice = Some(Notice::SaveFailed);
        reduce(&mut state, Intent::OpenCreate);
        assert_eq!(state.notice, Some(Notice::SaveFailed));
    }

    #[test]
    fn loaded_page_replaces_fetch_failure_but_keeps_mutation_notice() {
        let mut state = AppState::default();
        apply_outcome(&mut state, Outcome::ProductsFetched(Err(rejected())));
        apply_outcome(&mut state, Outcome::ProductsFetched(Ok(ProductPage::default())));
        assert_eq!(state.notice, None);

        state.notice = Some(Notice::Created);
        apply_outcome(&mut state, Outcome::ProductsFetched(Ok(ProductPage::default())));
        assert_eq!(state.notice, Some(Notice::Created));
    }
}
