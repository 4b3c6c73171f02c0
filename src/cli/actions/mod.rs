pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        backend_url: String,
        frontend_url: String,
        code_request_cooldown: u64,
        code_lifetime: u64,
        access_token_lifetime: u64,
        refresh_token_lifetime: u64,
        otp_length: usize,
    },
}
