pub static QUOTES_KEY: &str = "quotes";
pub static LAST_VIEWED_KEY: &str = "lastViewedQuote";

pub static DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub static REMOTE_FETCH_LIMIT: usize = 5;
pub static SERVER_CATEGORY: &str = "Server";

pub static DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
pub static DEFAULT_NOTIFICATION_SECS: u64 = 5;

/// category name meaning "no filter".
pub static ALL_CATEGORIES: &str = "all";

pub static SEED_QUOTES: [(&str, &str); 5] = [
    (
        "The best way to get started is to quit talking and begin doing.",
        "Motivation",
    ),
    ("Believe in yourself!", "Motivation"),
    (
        "The only true wisdom is in knowing you know nothing.",
        "Wisdom",
    ),
    ("Don’t let yesterday take up too much of today.", "Inspiration"),
    ("You learn more from failure than from success.", "Learning"),
];
