use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Canonical reason phrases keyed by HTTP status code
    static ref STATUS_PHRASES: HashMap<u16, &'static str> = {
        let mut m = HashMap::new();

        // 1xx Informational
        m.insert(100, "Continue");
        m.insert(101, "Switching Protocols");
        m.insert(102, "Processing");
        m.insert(103, "Early Hints");

        // 2xx Success
        m.insert(200, "OK");
        m.insert(201, "Created");
        m.insert(202, "Accepted");
        m.insert(203, "Non-Authoritative Information");
        m.insert(204, "No Content");
        m.insert(205, "Reset Content");
        m.insert(206, "Partial Content");
        m.insert(207, "Multi-Status");
        m.insert(208, "Already Reported");
        m.insert(226, "IM Used");

        // 3xx Redirection
        m.insert(300, "Multiple Choices");
        m.insert(301, "Moved Permanently");
        m.insert(302, "Found");
        m.insert(303, "See Other");
        m.insert(304, "Not Modified");
        m.insert(305, "Use Proxy");
        m.insert(306, "Switch Proxy");
        m.insert(307, "Temporary Redirect");
        m.insert(308, "Permanent Redirect");

        // 4xx Client Errors
        m.insert(400, "Bad Request");
        m.insert(401, "Unauthorized");
        m.insert(402, "Payment Required");
        m.insert(403, "Forbidden");
        m.insert(404, "Not Found");
        m.insert(405, "Method Not Allowed");
        m.insert(406, "Not Acceptable");
        m.insert(407, "Proxy Authentication Required");
        m.insert(408, "Request Timeout");
        m.insert(409, "Conflict");
        m.insert(410, "Gone");
        m.insert(411, "Length Required");
        m.insert(412, "Precondition Failed");
        m.insert(413, "Payload Too Large");
        m.insert(414, "URI Too Long");
        m.insert(415, "Unsupported Media Type");
        m.insert(416, "Range Not Satisfiable");
        m.insert(417, "Expectation Failed");
        m.insert(418, "I'm a Teapot");
        m.insert(421, "Misdirected Request");
        m.insert(422, "Unprocessable Entity");
        m.insert(423, "Locked");
        m.insert(424, "Failed Dependency");
        m.insert(425, "Too Early");
        m.insert(426, "Upgrade Required");
        m.insert(428, "Precondition Required");
        m.insert(429, "Too Many Requests");
        m.insert(431, "Request Header Fields Too Large");
        m.insert(451, "Unavailable For Legal Reasons");

        // 5xx Server Errors
        m.insert(500, "Internal Server Error");
        m.insert(501, "Not Implemented");
        m.insert(502, "Bad Gateway");
        m.insert(503, "Service Unavailable");
        m.insert(504, "Gateway Timeout");
        m.insert(505, "HTTP Version Not Supported");
        m.insert(506, "Variant Also Negotiates");
        m.insert(507, "Insufficient Storage");
        m.insert(508, "Loop Detected");
        m.insert(510, "Not Extended");
        m.insert(511, "Network Authentication Required");

        m
    };
}

/// Get the reason phrase for an HTTP status code, if it is a known one
pub fn phrase_for(status: u16) -> Option<&'static str> {
    STATUS_PHRASES.get(&status).copied()
}

/// Whether the status code has a canonical reason phrase
pub fn is_known(status: u16) -> bool {
    STATUS_PHRASES.contains_key(&status)
}
