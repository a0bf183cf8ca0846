use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Python release the standard-library name table is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PythonVersion {
    Py310,
    Py311,
    Py312,
    Py313,
}

impl Default for PythonVersion {
    fn default() -> Self {
        PythonVersion::Py312
    }
}

/// Modules present from 3.10 onward.
const BASE_MODULES: &[&str] = &[
    // A-B
    "abc", "aifc", "argparse", "array", "ast", "asynchat", "asyncio",
    "asyncore", "atexit", "audioop", "base64", "bdb", "binascii", "bisect",
    "builtins", "bz2",
    // C
    "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code", "codecs",
    "codeop", "collections", "colorsys", "compileall", "concurrent",
    "configparser", "contextlib", "contextvars", "copy", "copyreg",
    "cProfile", "crypt", "csv", "ctypes", "curses",
    // D-E
    "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis",
    "distutils", "doctest", "email", "encodings", "ensurepip", "enum",
    "errno",
    // F-G
    "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions",
    "ftplib", "functools", "gc", "getopt", "getpass", "gettext", "glob",
    "graphlib", "grp", "gzip",
    // H-I
    "hashlib", "heapq", "hmac", "html", "http", "idlelib", "imaplib",
    "imghdr", "imp", "importlib", "inspect", "io", "ipaddress", "itertools",
    // J-L
    "json", "keyword", "lib2to3", "linecache", "locale", "logging", "lzma",
    // M-N
    "mailbox", "mailcap", "marshal", "math", "mimetypes", "mmap",
    "modulefinder", "msilib", "msvcrt", "multiprocessing", "netrc", "nis",
    "nntplib", "ntpath", "numbers",
    // O-P
    "operator", "optparse", "os", "ossaudiodev", "pathlib", "pdb", "pickle",
    "pickletools", "pipes", "pkgutil", "platform", "plistlib", "poplib",
    "posix", "posixpath", "pprint", "profile", "pstats", "pty", "pwd",
    "py_compile", "pyclbr", "pydoc",
    // Q-R
    "queue", "quopri", "random", "re", "readline", "reprlib", "resource",
    "rlcompleter", "runpy",
    // S
    "sched", "secrets", "select", "selectors", "shelve", "shlex", "shutil",
    "signal", "site", "smtpd", "smtplib", "sndhdr", "socket", "socketserver",
    "spwd", "sqlite3", "ssl", "stat", "statistics", "string", "stringprep",
    "struct", "subprocess", "sunau", "symtable", "sys", "sysconfig",
    "syslog",
    // T
    "tabnanny", "tarfile", "telnetlib", "tempfile", "termios", "test",
    "textwrap", "threading", "time", "timeit", "tkinter", "token",
    "tokenize", "trace", "traceback", "tracemalloc", "tty", "turtle",
    "turtledemo", "types", "typing",
    // U-Z
    "unicodedata", "unittest", "urllib", "uu", "uuid", "venv", "warnings",
    "wave", "weakref", "webbrowser", "winreg", "winsound", "wsgiref",
    "xdrlib", "xml", "xmlrpc", "zipapp", "zipfile", "zipimport", "zlib",
    "zoneinfo",
    // Underscore prefixed (internal but commonly imported)
    "_thread", "__future__",
];

/// Removed in 3.12 (PEP 594 first wave plus distutils/imp).
const REMOVED_IN_312: &[&str] = &["asynchat", "asyncore", "distutils", "imp", "smtpd"];

/// The PEP 594 "dead batteries" removed in 3.13.
const REMOVED_IN_313: &[&str] = &[
    "aifc", "audioop", "cgi", "cgitb", "chunk", "crypt", "imghdr", "lib2to3",
    "mailcap", "msilib", "nis", "nntplib", "ossaudiodev", "pipes", "sndhdr",
    "spwd", "sunau", "telnetlib", "uu", "xdrlib",
];

/// Import-name to distribution-name lookup, for packages published under a
/// different name than the module they install. Fixed table; anything
/// beyond it is out of scope.
const DISTRIBUTION_NAMES: &[(&str, &str)] = &[
    ("attr", "attrs"),
    ("bs4", "beautifulsoup4"),
    ("Crypto", "pycryptodome"),
    ("cv2", "opencv-python"),
    ("dateutil", "python-dateutil"),
    ("dotenv", "python-dotenv"),
    ("fitz", "PyMuPDF"),
    ("OpenSSL", "pyOpenSSL"),
    ("PIL", "Pillow"),
    ("pkg_resources", "setuptools"),
    ("sklearn", "scikit-learn"),
    ("yaml", "PyYAML"),
];

/// Immutable standard-library name table, constructed once per scan and
/// passed explicitly to the classifier.
#[derive(Debug, Clone)]
pub struct StdlibTable {
    version: PythonVersion,
    names: HashSet<&'static str>,
}

impl StdlibTable {
    pub fn for_version(version: PythonVersion) -> Self {
        let mut names: HashSet<&'static str> = BASE_MODULES.iter().copied().collect();

        if version >= PythonVersion::Py311 {
            names.insert("tomllib");
        }
        if version >= PythonVersion::Py312 {
            for name in REMOVED_IN_312 {
                names.remove(name);
            }
        }
        if version >= PythonVersion::Py313 {
            for name in REMOVED_IN_313 {
                names.remove(name);
            }
        }

        Self { version, names }
    }

    pub fn version(&self) -> PythonVersion {
        self.version
    }

    pub fn contains(&self, top_level: &str) -> bool {
        self.names.contains(top_level)
    }
}

impl Default for StdlibTable {
    fn default() -> Self {
        Self::for_version(PythonVersion::default())
    }
}

/// Look up the distribution name for an import name, when the two differ.
pub fn distribution_name(top_level: &str) -> Option<&'static str> {
    DISTRIBUTION_NAMES
        .iter()
        .find(|(module, _)| *module == top_level)
        .map(|(_, dist)| *dist)
}
