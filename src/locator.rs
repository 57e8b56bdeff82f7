//! Semantic element locators for the AgencyFlow auth pages.
//!
//! Elements are addressed by what they are (field type within the form),
//! not by their position in the markup tree, so cosmetic restructuring of
//! the pages does not break the scenario. Where a form holds several
//! elements of the same kind (password vs. confirm-password), the locator
//! carries an explicit match index.

use std::fmt;

/// A CSS selector plus the index of the match to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub css: &'static str,
    pub nth: usize,
}

impl Locator {
    pub const fn css(css: &'static str) -> Self {
        Self { css, nth: 0 }
    }

    pub const fn nth(css: &'static str, nth: usize) -> Self {
        Self { css, nth }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nth == 0 {
            write!(f, "{}", self.css)
        } else {
            write!(f, "{} (match #{})", self.css, self.nth)
        }
    }
}

/// Locators for the login form (`pages/Login.tsx`): one email input, one
/// password input, a submit button, and the "Criar conta" link to the
/// sign-up page.
pub mod login {
    use super::Locator;

    pub const EMAIL: Locator = Locator::css("form input[type=email]");
    pub const PASSWORD: Locator = Locator::css("form input[type=password]");
    pub const SUBMIT: Locator = Locator::css("form button[type=submit]");
    pub const CREATE_ACCOUNT_LINK: Locator = Locator::css("a[href='/signup']");
}

/// Locators for the account-creation form: full name, email, password,
/// confirm-password, and the "Criar Conta" submit button. Email and the
/// password pair come from `pages/SignUp.tsx`; the full-name field is part
/// of the scripted scenario and addressed by its input kind.
pub mod signup {
    use super::Locator;

    pub const FULL_NAME: Locator = Locator::css("form input[type=text]");
    pub const EMAIL: Locator = Locator::css("form input[type=email]");
    pub const PASSWORD: Locator = Locator::css("form input[type=password]");
    pub const CONFIRM_PASSWORD: Locator = Locator::nth("form input[type=password]", 1);
    pub const SUBMIT: Locator = Locator::css("form button[type=submit]");
}
