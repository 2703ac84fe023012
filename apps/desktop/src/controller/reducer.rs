//! View regions and their transitions. Regions are mutually exclusive:
//! showing one hides all others, and the session state gates which
//! transitions are reachable at all.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    AllStories,
    SubmitForm,
    Favorites,
    OwnStories,
    Profile,
    AuthForms,
}

impl View {
    pub fn requires_login(self) -> bool {
        matches!(
            self,
            View::SubmitForm | View::Favorites | View::OwnStories | View::Profile
        )
    }
}

/// Whether a navigation target is reachable for the current session state.
/// The listing is always reachable; the login/signup forms only make sense
/// while anonymous; everything else needs a signed-in user.
pub fn reachable(target: View, logged_in: bool) -> bool {
    match target {
        View::AllStories => true,
        View::AuthForms => !logged_in,
        _ => logged_in,
    }
}

/// Applies a navigation click. Unreachable targets leave the view unchanged.
pub fn transition(current: View, target: View, logged_in: bool) -> View {
    if reachable(target, logged_in) {
        target
    } else {
        current
    }
}

/// Successful login or signup hides the auth forms and lands on the listing.
pub fn after_auth() -> View {
    View::AllStories
}

/// Logout is terminal for the session: the persisted session is cleared by
/// the caller and the view resets to the initial anonymous listing.
pub fn after_logout() -> View {
    View::AllStories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sessions_only_reach_listing_and_auth_forms() {
        for target in [
            View::SubmitForm,
            View::Favorites,
            View::OwnStories,
            View::Profile,
        ] {
            assert!(!reachable(target, false), "{target:?} needs a login");
            assert_eq!(transition(View::AllStories, target, false), View::AllStories);
        }
        assert!(reachable(View::AllStories, false));
        assert!(reachable(View::AuthForms, false));
    }

    #[test]
    fn logged_in_sessions_reach_everything_except_auth_forms() {
        for target in [
            View::AllStories,
            View::SubmitForm,
            View::Favorites,
            View::OwnStories,
            View::Profile,
        ] {
            assert_eq!(transition(View::AllStories, target, true), target);
        }
        assert_eq!(
            transition(View::Favorites, View::AuthForms, true),
            View::Favorites
        );
    }

    #[test]
    fn auth_and_logout_land_on_the_listing() {
        assert_eq!(after_auth(), View::AllStories);
        assert_eq!(after_logout(), View::AllStories);
    }

    #[test]
    fn requires_login_matches_gating() {
        for target in [
            View::AllStories,
            View::SubmitForm,
            View::Favorites,
            View::OwnStories,
            View::Profile,
            View::AuthForms,
        ] {
            if target.requires_login() {
                assert!(!reachable(target, false));
                assert!(reachable(target, true));
            }
        }
    }
}
