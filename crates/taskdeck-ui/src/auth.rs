use taskdeck_shared::validate::RegisterErrors;
use taskdeck_shared::{LoginPayload, ProfileUpdate, RegisterPayload, UserDto};
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::{classes, function_component, html, use_effect_with, use_state, Callback, Html,
    Properties, TargetCast};

use crate::ui::Modal;

#[derive(Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Login,
    Register,
}

#[derive(Properties, PartialEq)]
pub struct AuthPanelProps {
    pub login_error: Option<String>,
    pub register_errors: RegisterErrors,
    /// Set briefly after a failed submit to run the shake animation.
    pub shake: bool,
    pub on_login: Callback<LoginPayload>,
    pub on_register: Callback<RegisterPayload>,
}

#[function_component(AuthPanel)]
pub fn auth_panel(props: &AuthPanelProps) -> Html {
    let mode = use_state(|| AuthMode::Login);

    let switch_to = |target: AuthMode| {
        let mode = mode.clone();
        Callback::from(move |_| mode.set(target))
    };

    html! {
        <div class="auth-container">
            <div class={classes!("auth-box", props.shake.then_some("error"))}>
                {
                    match *mode {
                        AuthMode::Login => html! {
                            <>
                                <LoginForm
                                    error={props.login_error.clone()}
                                    on_submit={props.on_login.clone()}
                                />
                                <p class="auth-switch">
                                    { "No account yet? " }
                                    <a onclick={switch_to(AuthMode::Register)}>{ "Register" }</a>
                                </p>
                            </>
                        },
                        AuthMode::Register => html! {
                            <>
                                <RegisterForm
                                    errors={props.register_errors.clone()}
                                    on_submit={props.on_register.clone()}
                                />
                                <p class="auth-switch">
                                    { "Already registered? " }
                                    <a onclick={switch_to(AuthMode::Login)}>{ "Sign in" }</a>
                                </p>
                            </>
                        },
                    }
                }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LoginFormProps {
    pub error: Option<String>,
    pub on_submit: Callback<LoginPayload>,
}

#[function_component(LoginForm)]
pub fn login_form(props: &LoginFormProps) -> Html {
    let username = use_state(String::new);
    let password = use_state(String::new);

    let on_username = {
        let username = username.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            username.set(input.value());
        })
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            password.set(input.value());
        })
    };
    let onsubmit = {
        let username = username.clone();
        let password = password.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |event: web_sys::SubmitEvent| {
            event.prevent_default();
            on_submit.emit(LoginPayload {
                username: (*username).clone(),
                password: (*password).clone(),
            });
        })
    };

    html! {
        <form class="auth-form" {onsubmit}>
            <h2>{ "Sign In" }</h2>
            <div class="field">
                <label>{ "Username" }</label>
                <input type="text" value={(*username).clone()} oninput={on_username} />
            </div>
            <div class="field">
                <label>{ "Password" }</label>
                <input type="password" value={(*password).clone()} oninput={on_password} />
            </div>
            {
                if let Some(error) = &props.error {
                    html! { <div class="error-message">{ error }</div> }
                } else {
                    html! {}
                }
            }
            <button type="submit" class="btn primary">{ "Sign In" }</button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct RegisterFormProps {
    pub errors: RegisterErrors,
    pub on_submit: Callback<RegisterPayload>,
}

#[function_component(RegisterForm)]
pub fn register_form(props: &RegisterFormProps) -> Html {
    let payload = use_state(RegisterPayload::default);

    let edit = |apply: fn(&mut RegisterPayload, String)| {
        let payload = payload.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = (*payload).clone();
            apply(&mut next, input.value());
            payload.set(next);
        })
    };

    let onsubmit = {
        let payload = payload.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |event: web_sys::SubmitEvent| {
            event.prevent_default();
            on_submit.emit((*payload).clone());
        })
    };

    let field_error = |message: &Option<String>| match message {
        Some(text) => html! { <div class="error-message">{ text }</div> },
        None => html! {},
    };

    html! {
        <form class="auth-form" {onsubmit}>
            <h2>{ "Create Account" }</h2>
            <div class="field">
                <label>{ "Username" }</label>
                <input
                    type="text"
                    value={payload.username.clone()}
                    oninput={edit(|payload, value| payload.username = value)}
                />
                { field_error(&props.errors.username) }
            </div>
            <div class="field">
                <label>{ "Email" }</label>
                <input
                    type="email"
                    value={payload.email.clone()}
                    oninput={edit(|payload, value| payload.email = value)}
                />
                { field_error(&props.errors.email) }
            </div>
            <div class="field-row">
                <div class="field">
                    <label>{ "First Name" }</label>
                    <input
                        type="text"
                        value={payload.first_name.clone()}
                        oninput={edit(|payload, value| payload.first_name = value)}
                    />
                </div>
                <div class="field">
                    <label>{ "Last Name" }</label>
                    <input
                        type="text"
                        value={payload.last_name.clone()}
                        oninput={edit(|payload, value| payload.last_name = value)}
                    />
                </div>
            </div>
            <div class="field">
                <label>{ "Password" }</label>
                <input
                    type="password"
                    value={payload.password.clone()}
                    oninput={edit(|payload, value| payload.password = value)}
                />
                { field_error(&props.errors.password) }
            </div>
            <div class="field">
                <label>{ "Confirm Password" }</label>
                <input
                    type="password"
                    value={payload.password_confirm.clone()}
                    oninput={edit(|payload, value| payload.password_confirm = value)}
                />
                { field_error(&props.errors.password_confirm) }
            </div>
            { field_error(&props.errors.non_field) }
            <button type="submit" class="btn primary">{ "Register" }</button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProfileModalProps {
    pub open: bool,
    pub user: Option<UserDto>,
    pub on_save: Callback<ProfileUpdate>,
    pub on_close: Callback<()>,
}

#[function_component(ProfileModal)]
pub fn profile_modal(props: &ProfileModalProps) -> Html {
    let first_name = use_state(String::new);
    let last_name = use_state(String::new);
    let email = use_state(String::new);
    let bio = use_state(String::new);

    // Reseed the drafts from the signed-in user each time the modal opens.
    {
        let first_name = first_name.clone();
        let last_name = last_name.clone();
        let email = email.clone();
        let bio = bio.clone();
        let user = props.user.clone();
        use_effect_with(props.open, move |open| {
            if *open && let Some(user) = user {
                first_name.set(user.first_name);
                last_name.set(user.last_name);
                email.set(user.email);
                bio.set(user.bio);
            }
            || ()
        });
    }

    let edit_input = |state: yew::UseStateHandle<String>| {
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            state.set(input.value());
        })
    };
    let on_bio = {
        let bio = bio.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let area: HtmlTextAreaElement = event.target_unchecked_into();
            bio.set(area.value());
        })
    };

    let on_save = {
        let first_name = first_name.clone();
        let last_name = last_name.clone();
        let email = email.clone();
        let bio = bio.clone();
        let on_save = props.on_save.clone();
        Callback::from(move |_| {
            on_save.emit(ProfileUpdate {
                first_name: Some((*first_name).clone()),
                last_name: Some((*last_name).clone()),
                email: Some((*email).clone()),
                bio: Some((*bio).clone()),
                theme_preference: None,
            });
        })
    };

    html! {
        <Modal open={props.open} title={"Profile".to_string()} on_close={props.on_close.clone()}>
            <div class="field-row">
                <div class="field">
                    <label>{ "First Name" }</label>
                    <input type="text" value={(*first_name).clone()} oninput={edit_input(first_name.clone())} />
                </div>
                <div class="field">
                    <label>{ "Last Name" }</label>
                    <input type="text" value={(*last_name).clone()} oninput={edit_input(last_name.clone())} />
                </div>
            </div>
            <div class="field">
                <label>{ "Email" }</label>
                <input type="email" value={(*email).clone()} oninput={edit_input(email.clone())} />
            </div>
            <div class="field">
                <label>{ "Bio" }</label>
                <textarea value={(*bio).clone()} oninput={on_bio} />
            </div>
            <div class="actions">
                <button class="btn primary" onclick={on_save}>{ "Save Profile" }</button>
            </div>
        </Modal>
    }
}
