//! Response abstraction used by the retry engine.
//!
//! The engine never touches headers or bodies. All it needs from a response
//! is the status code, so any response type can be retried once it
//! implements [`HttpStatus`].

/// A received HTTP response, seen only through its status code.
pub trait HttpStatus {
    /// Numeric HTTP status code (e.g. 200, 404, 503)
    fn status_code(&self) -> u16;
}

impl HttpStatus for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl<B> HttpStatus for http::Response<B> {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl HttpStatus for http::StatusCode {
    fn status_code(&self) -> u16 {
        self.as_u16()
    }
}

impl<T: HttpStatus + ?Sized> HttpStatus for &T {
    fn status_code(&self) -> u16 {
        (**self).status_code()
    }
}

impl<T: HttpStatus + ?Sized> HttpStatus for Box<T> {
    fn status_code(&self) -> u16 {
        (**self).status_code()
    }
}
