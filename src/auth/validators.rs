use super::models::{LoginRequest, ResetPasswordRequest, SignupRequest, VerifyEmailRequest};
use super::password::MIN_PASSWORD_LENGTH;
use crate::common::validation::is_valid_email;
use crate::common::{ValidationResult, Validator};

const MAX_NAME_LENGTH: usize = 100;

fn check_email(result: &mut ValidationResult, email: &str) {
    if email.trim().is_empty() {
        result.add_error("email", "Email is required");
    } else if !is_valid_email(email) {
        result.add_error("email", "Please provide a valid email");
    }
}

fn check_otp(result: &mut ValidationResult, otp: &str) {
    let otp = otp.trim();
    if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
        result.add_error("otp", "OTP must be a 6-digit code");
    }
}

fn check_new_password(result: &mut ValidationResult, field: &str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        result.add_error(field, "Password must be at least 6 characters long");
    }
}

pub struct SignupValidator;

impl Validator<SignupRequest> for SignupValidator {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        check_new_password(&mut result, "password", &data.password);

        if let Some(name) = &data.name {
            if name.chars().count() > MAX_NAME_LENGTH {
                result.add_error("name", "Name must not exceed 100 characters");
            }
        }
        result
    }
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }
        result
    }
}

pub struct VerifyEmailValidator;

impl Validator<VerifyEmailRequest> for VerifyEmailValidator {
    fn validate(&self, data: &VerifyEmailRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        check_otp(&mut result, &data.otp);
        result
    }
}

pub struct ResetPasswordValidator;

impl Validator<ResetPasswordRequest> for ResetPasswordValidator {
    fn validate(&self, data: &ResetPasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        check_otp(&mut result, &data.otp);
        check_new_password(&mut result, "newPassword", &data.new_password);
        result
    }
}
