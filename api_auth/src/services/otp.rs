use rand::Rng;

pub const OTP_LENGTH: u32 = 6;

/// Generates a numeric signup code, always `OTP_LENGTH` digits.
pub fn generate_otp() -> String {
    let low = 10u32.pow(OTP_LENGTH - 1);
    rand::rng().random_range(low..low * 10).to_string()
}
