//! The rule catalogue, in priority order.

use super::pattern::Part::{self, Any, Optional, Slot, Word};

/// A natural-language rule: any of `patterns` yields `template`.
#[derive(Debug)]
pub struct Rule {
    pub id: &'static str,
    pub patterns: &'static [&'static [Part]],
    /// Canonical command with `{slot}` / `{slot:glob}` placeholders.
    pub template: &'static str,
    /// Human-readable description shown to the user.
    pub action: &'static str,
}

const DIR: &[&str] = &["directory", "folder", "dir"];
const THE: Part = Optional(&["the"]);
const ME: Part = Optional(&["me"]);
const LIST: &[&str] = &["list", "show", "display"];
const SHOW: &[&str] = &["show", "display", "print"];
const DELETE: &[&str] = &["delete", "remove", "erase"];
const WHAT_IS: &[&str] = &["what's", "whats", "what is"];
const QUERY: &[&str] = &["show", "display", "check", "what's", "whats", "what is"];
const HERE: &[&str] = &[
    "here",
    "in here",
    "in this directory",
    "in this folder",
    "in the current directory",
    "in the current folder",
    "in current directory",
];

pub static RULES: &[Rule] = &[
    Rule {
        id: "create-file",
        patterns: &[
            &[
                Word(&["create", "make"]),
                Optional(&["a", "an", "the"]),
                Optional(&["new", "empty", "blank"]),
                Word(&["file"]),
                Optional(&["called", "named"]),
                Slot("name"),
            ],
            &[Word(&["new"]), Word(&["file"]), Optional(&["called", "named"]), Slot("name")],
        ],
        template: "touch {name}",
        action: "Create a new file",
    },
    Rule {
        id: "create-directory",
        patterns: &[
            &[
                Word(&["create", "make"]),
                Optional(&["a", "an", "the"]),
                Optional(&["new", "empty"]),
                Word(DIR),
                Optional(&["called", "named"]),
                Slot("name"),
            ],
            &[Word(&["new"]), Word(DIR), Optional(&["called", "named"]), Slot("name")],
        ],
        template: "mkdir {name}",
        action: "Create a new directory",
    },
    Rule {
        id: "list-files",
        patterns: &[
            &[
                Word(LIST),
                ME,
                Optional(&["all"]),
                THE,
                Word(&["files", "everything"]),
                Optional(HERE),
            ],
            &[
                Word(LIST),
                ME,
                THE,
                Word(&["contents", "content"]),
                Word(&["of", "in"]),
                Optional(&["this", "the"]),
                Optional(&["current"]),
                Word(DIR),
            ],
            &[Word(&["what", "which"]), Word(&["files"]), Word(&["are"]), Optional(HERE)],
            &[Word(&["show", "tell"]), ME, Word(WHAT_IS), Word(HERE)],
            &[Word(WHAT_IS), Word(HERE)],
        ],
        template: "ls -la",
        action: "List files in the current directory",
    },
    Rule {
        id: "list-directory",
        patterns: &[
            &[
                Word(LIST),
                ME,
                Optional(&["all"]),
                THE,
                Word(&["files"]),
                Word(&["in", "inside", "of"]),
                THE,
                Slot("dir"),
                Optional(DIR),
            ],
            &[
                Word(LIST),
                ME,
                THE,
                Word(&["contents", "content"]),
                Word(&["of", "in"]),
                THE,
                Slot("dir"),
                Word(DIR),
            ],
        ],
        template: "ls -la {dir}",
        action: "List files in a directory",
    },
    Rule {
        id: "current-directory",
        patterns: &[
            &[Word(&["where"]), Word(&["am"]), Word(&["i"])],
            &[
                Word(WHAT_IS),
                Optional(&["my", "the"]),
                Optional(&["current"]),
                Optional(&["working"]),
                Word(DIR),
            ],
            &[Word(&["which", "what"]), Word(DIR), Word(&["am i in", "is this"])],
            &[
                Word(SHOW),
                ME,
                THE,
                Optional(&["current"]),
                Optional(&["working"]),
                Word(DIR),
            ],
        ],
        template: "pwd",
        action: "Show the current directory",
    },
    Rule {
        id: "parent-directory",
        patterns: &[
            &[
                Word(&["go", "move", "navigate"]),
                Word(&["up"]),
                Optional(&["one", "a"]),
                Optional(&["level", "directory", "folder"]),
            ],
            &[
                Word(&["go", "move", "navigate"]),
                Optional(&["back"]),
                Word(&["to"]),
                THE,
                Word(&["parent"]),
                Optional(DIR),
            ],
        ],
        template: "cd ..",
        action: "Go to the parent directory",
    },
    Rule {
        id: "home-directory",
        patterns: &[&[
            Word(&["go", "move", "navigate"]),
            Optional(&["to"]),
            Optional(&["my", "the"]),
            Word(&["home"]),
            Optional(DIR),
        ]],
        template: "cd",
        action: "Go to the home directory",
    },
    Rule {
        id: "copy-directory",
        patterns: &[&[
            Word(&["copy", "duplicate"]),
            THE,
            Word(DIR),
            Slot("src"),
            Word(&["to", "into", "as"]),
            THE,
            Slot("dst"),
            Optional(DIR),
        ]],
        template: "cp -r {src} {dst}",
        action: "Copy a directory",
    },
    Rule {
        id: "copy-file",
        patterns: &[&[
            Word(&["copy", "duplicate"]),
            THE,
            Optional(&["file"]),
            Slot("src"),
            Word(&["to", "into", "as"]),
            THE,
            Slot("dst"),
            Optional(DIR),
        ]],
        template: "cp {src} {dst}",
        action: "Copy a file",
    },
    Rule {
        id: "move-file",
        patterns: &[&[
            Word(&["move", "rename"]),
            THE,
            Optional(&["file"]),
            Slot("src"),
            Word(&["to", "into", "as"]),
            THE,
            Slot("dst"),
            Optional(DIR),
        ]],
        template: "mv {src} {dst}",
        action: "Move or rename a file",
    },
    Rule {
        id: "delete-directory",
        patterns: &[
            &[Word(DELETE), THE, Word(DIR), Slot("name")],
            &[Word(DELETE), THE, Slot("name"), Word(DIR)],
        ],
        template: "rm -r {name}",
        action: "Delete a directory",
    },
    Rule {
        id: "delete-file",
        patterns: &[&[Word(DELETE), THE, Optional(&["file"]), Slot("name")]],
        template: "rm {name}",
        action: "Delete a file",
    },
    Rule {
        id: "change-directory",
        patterns: &[
            &[
                Word(&["change", "switch"]),
                THE,
                Optional(&["current", "working"]),
                Word(DIR),
                Word(&["to"]),
                Slot("dir"),
            ],
            &[
                Word(&["go", "move", "navigate", "change", "switch"]),
                Word(&["to", "into"]),
                THE,
                Optional(DIR),
                Slot("dir"),
                Optional(DIR),
            ],
            &[Word(&["enter"]), THE, Optional(DIR), Slot("dir"), Optional(DIR)],
        ],
        template: "cd {dir}",
        action: "Change directory",
    },
    Rule {
        id: "show-file",
        patterns: &[
            &[
                Word(&["show", "display", "print", "read", "view"]),
                ME,
                THE,
                Word(&["contents", "content"]),
                Word(&["of"]),
                THE,
                Optional(&["file"]),
                Slot("file"),
            ],
            &[Word(SHOW), ME, THE, Word(&["file"]), Slot("file")],
            &[Word(&["read", "view", "open"]), THE, Optional(&["file"]), Slot("file")],
            &[Word(WHAT_IS), Word(&["in"]), THE, Word(&["file"]), Slot("file")],
        ],
        template: "cat {file}",
        action: "Show file contents",
    },
    Rule {
        id: "file-head",
        patterns: &[&[
            Word(SHOW),
            ME,
            THE,
            Word(&["first", "top"]),
            Optional(&["few", "ten", "10"]),
            Word(&["lines"]),
            Word(&["of", "in"]),
            THE,
            Optional(&["file"]),
            Slot("file"),
        ]],
        template: "head {file}",
        action: "Show the beginning of a file",
    },
    Rule {
        id: "file-tail",
        patterns: &[&[
            Word(SHOW),
            ME,
            THE,
            Word(&["last", "bottom"]),
            Optional(&["few", "ten", "10"]),
            Word(&["lines"]),
            Word(&["of", "in"]),
            THE,
            Optional(&["file"]),
            Slot("file"),
        ]],
        template: "tail {file}",
        action: "Show the end of a file",
    },
    Rule {
        id: "search-text",
        patterns: &[
            &[
                Word(&["search", "look"]),
                Word(&["for"]),
                Slot("pattern"),
                Word(&["in", "inside"]),
                THE,
                Optional(&["file"]),
                Slot("file"),
            ],
            &[
                Word(&["find"]),
                Slot("pattern"),
                Word(&["in"]),
                THE,
                Word(&["file"]),
                Slot("file"),
            ],
        ],
        template: "grep {pattern} {file}",
        action: "Search for text in a file",
    },
    Rule {
        id: "find-files",
        patterns: &[
            &[
                Word(&["find"]),
                Optional(&["all"]),
                THE,
                Word(&["files", "file"]),
                Optional(&["called", "named", "matching", "with name"]),
                Slot("name"),
            ],
            &[
                Word(&["search", "look"]),
                Word(&["for"]),
                Optional(&["all"]),
                Optional(&["files", "file"]),
                Optional(&["called", "named", "matching"]),
                Slot("name"),
            ],
            &[Word(&["locate"]), Slot("name")],
        ],
        template: "find . {name:glob}",
        action: "Find files by name",
    },
    Rule {
        id: "list-processes",
        patterns: &[
            &[
                Word(LIST),
                ME,
                Optional(&["all"]),
                THE,
                Optional(&["running"]),
                Word(&["processes", "programs"]),
            ],
            &[
                Word(&["what"]),
                Optional(&["processes", "programs"]),
                Word(&["are", "is"]),
                Word(&["running"]),
            ],
        ],
        template: "ps",
        action: "Show running processes",
    },
    Rule {
        id: "memory-usage",
        patterns: &[
            &[Word(QUERY), Any, Word(&["memory", "ram"]), Any],
            &[Word(&["how"]), Word(&["much"]), Any, Word(&["memory", "ram"]), Any],
        ],
        template: "free -h",
        action: "Show memory usage",
    },
    Rule {
        id: "disk-usage",
        patterns: &[
            &[Word(QUERY), Any, Word(&["disk", "storage"]), Any],
            &[Word(&["how"]), Word(&["much"]), Any, Word(&["disk", "storage", "space"]), Any],
        ],
        template: "df -h",
        action: "Show disk usage",
    },
    Rule {
        id: "cpu-info",
        patterns: &[&[Word(QUERY), Any, Word(&["cpu", "processor"]), Any]],
        template: "lscpu",
        action: "Show CPU information",
    },
    Rule {
        id: "uptime",
        patterns: &[
            &[Word(&["how"]), Word(&["long"]), Any, Word(&["up", "running"])],
            &[Word(QUERY), THE, Optional(&["system"]), Word(&["uptime"])],
        ],
        template: "uptime",
        action: "Show system uptime",
    },
    Rule {
        id: "date-time",
        patterns: &[
            &[Word(&["what"]), Word(&["time", "date", "day"]), Word(&["is it"])],
            &[
                Word(WHAT_IS),
                THE,
                Optional(&["current"]),
                Optional(&["today's", "todays"]),
                Word(&["time", "date", "day"]),
                Optional(&["today"]),
            ],
            &[
                Word(&["show", "display", "tell me"]),
                THE,
                Optional(&["current"]),
                Word(&["time", "date"]),
            ],
        ],
        template: "date",
        action: "Show the date and time",
    },
    Rule {
        id: "who-am-i",
        patterns: &[
            &[Word(&["who"]), Word(&["am"]), Word(&["i"])],
            &[
                Word(WHAT_IS),
                Word(&["my"]),
                Optional(&["current"]),
                Word(&["username", "user name", "user", "login"]),
            ],
        ],
        template: "whoami",
        action: "Show the current user",
    },
    Rule {
        id: "environment",
        patterns: &[&[
            Word(LIST),
            ME,
            Optional(&["all"]),
            THE,
            Word(&["environment variables", "environment", "env vars", "variables"]),
        ]],
        template: "env",
        action: "Show environment variables",
    },
    Rule {
        id: "history",
        patterns: &[
            &[Word(LIST), ME, Optional(&["my", "the"]), Optional(&["command"]), Word(&["history"])],
            &[Word(&["what"]), Word(&["did"]), Word(&["i"]), Word(&["run", "type"]), Any],
        ],
        template: "history",
        action: "Show command history",
    },
    Rule {
        id: "clear-screen",
        patterns: &[&[
            Word(&["clear", "clean", "wipe", "reset"]),
            THE,
            Word(&["screen", "terminal", "console"]),
        ]],
        template: "clear",
        action: "Clear the terminal screen",
    },
    Rule {
        id: "help",
        patterns: &[
            &[Word(&["what"]), Word(&["can"]), Word(&["you"]), Word(&["do"])],
            &[
                Word(LIST),
                ME,
                Optional(&["all"]),
                THE,
                Optional(&["available"]),
                Word(&["commands"]),
            ],
            &[Word(&["i"]), Word(&["need"]), Word(&["help"])],
        ],
        template: "help",
        action: "Show available commands",
    },
];
