//! Canned answers used by the local synthesizer.

/// Keyword topics in match order. A topic matches when any keyword is a
/// substring of the lowercased input and no excluded word is present.
pub(crate) struct Topic {
    pub keywords: &'static [&'static str],
    pub excluded: &'static [&'static str],
    pub short: &'static str,
    pub expanded: &'static str,
}

pub(crate) const TOPICS: &[Topic] = &[
    Topic {
        keywords: &["neural network", "neural net"],
        excluded: &[],
        short: "Neural networks are computing systems inspired by biological brains.",
        expanded: "Neural networks are computing systems inspired by biological brains. They consist of interconnected nodes (neurons) that process information. Each connection has a weight that adjusts during training. Neural networks can learn patterns from data and make predictions or classifications. They're fundamental to modern AI and machine learning.",
    },
    Topic {
        keywords: &["machine learning", "ml"],
        excluded: &[],
        short: "Machine learning is AI that learns from data without explicit programming.",
        expanded: "Machine learning is a subset of artificial intelligence that enables computers to learn and improve from experience without being explicitly programmed. It uses algorithms to identify patterns in data and make predictions or decisions. Common types include supervised learning, unsupervised learning, and reinforcement learning.",
    },
    Topic {
        keywords: &["artificial intelligence", "ai"],
        excluded: &[],
        short: "AI is technology that enables machines to simulate human intelligence.",
        expanded: "Artificial Intelligence (AI) is technology that enables machines to simulate human intelligence. It includes machine learning, natural language processing, computer vision, and robotics. AI can perform tasks like recognizing speech, making decisions, and solving problems that typically require human intelligence.",
    },
    Topic {
        keywords: &["deep learning"],
        excluded: &[],
        short: "Deep learning uses neural networks with multiple layers.",
        expanded: "Deep learning is a subset of machine learning that uses artificial neural networks with multiple layers (hence \"deep\"). These networks can automatically learn hierarchical representations of data. Deep learning has revolutionized fields like computer vision, natural language processing, and speech recognition.",
    },
    Topic {
        keywords: &["blockchain"],
        excluded: &[],
        short: "Blockchain is a distributed, secure digital ledger.",
        expanded: "Blockchain is a distributed digital ledger that records transactions across multiple computers securely. Each block contains transaction data and is linked to the previous block, creating a chain. It's decentralized, transparent, and tamper-resistant, making it ideal for cryptocurrencies and other applications requiring trust and security.",
    },
    Topic {
        keywords: &["cloud computing"],
        excluded: &[],
        short: "Cloud computing provides on-demand computing resources over the internet.",
        expanded: "Cloud computing is the on-demand availability of computer system resources (servers, storage, databases, networking) over the internet. Users can access these resources without managing physical infrastructure. Major providers include AWS, Google Cloud, and Microsoft Azure. Benefits include scalability, cost-effectiveness, and flexibility.",
    },
    Topic {
        keywords: &["api"],
        // "capital" contains "api"
        excluded: &["capital"],
        short: "An API is a set of rules for building software applications.",
        expanded: "An API (Application Programming Interface) is a set of rules and protocols that allows different software applications to communicate with each other. APIs define the methods and data formats that applications can use to request and exchange information. They're essential for modern software development and integration.",
    },
    Topic {
        keywords: &["python"],
        excluded: &[],
        short: "Python is a high-level, interpreted programming language.",
        expanded: "Python is a high-level, interpreted programming language known for its simplicity and readability. It's widely used in web development, data science, artificial intelligence, automation, and scientific computing. Python has a large standard library and extensive third-party packages.",
    },
    Topic {
        keywords: &["javascript"],
        excluded: &[],
        short: "JavaScript is a programming language for web development.",
        expanded: "JavaScript is a high-level, interpreted programming language that is one of the core technologies of the World Wide Web. It enables interactive web pages and is an essential part of web applications. JavaScript can be used on both the client-side and server-side (Node.js).",
    },
    Topic {
        keywords: &["react"],
        excluded: &[],
        short: "React is a JavaScript library for building user interfaces.",
        expanded: "React is a JavaScript library developed by Facebook for building user interfaces, particularly single-page applications. It allows developers to create reusable UI components and efficiently update the DOM when data changes. React uses a virtual DOM for performance optimization and follows a component-based architecture.",
    },
    Topic {
        keywords: &["html"],
        excluded: &[],
        short: "HTML is the standard markup language for web pages.",
        expanded: "HTML (HyperText Markup Language) is the standard markup language for creating web pages. It describes the structure of web content using a system of elements and tags. HTML is the backbone of web development and works alongside CSS and JavaScript.",
    },
    Topic {
        keywords: &["css"],
        excluded: &[],
        short: "CSS is a style sheet language for styling web pages.",
        expanded: "CSS (Cascading Style Sheets) is a style sheet language used for describing the presentation of a document written in HTML. CSS describes how elements should be rendered on screen, on paper, in speech, or on other media.",
    },
];

/// Country (lowercase, as matched) to capital, in match order.
pub(crate) const CAPITALS: &[(&str, &str)] = &[
    ("france", "Paris"),
    ("germany", "Berlin"),
    ("japan", "Tokyo"),
    ("canada", "Ottawa"),
    ("australia", "Canberra"),
    ("brazil", "Brasília"),
    ("india", "New Delhi"),
    ("china", "Beijing"),
    ("russia", "Moscow"),
    ("uk", "London"),
    ("united kingdom", "London"),
    ("usa", "Washington, D.C."),
    ("united states", "Washington, D.C."),
];

/// (topic phrase, short, expanded)
pub(crate) const HOW_TO: &[(&str, &str, &str)] = &[
    (
        "learn programming",
        "Start with Python or JavaScript basics.",
        "To learn programming, start with a beginner-friendly language like Python or JavaScript. Practice with small projects, use online resources like freeCodeCamp or Codecademy, and build a portfolio of projects.",
    ),
    (
        "build a website",
        "Learn HTML, CSS, and JavaScript.",
        "To build a website, learn HTML for structure, CSS for styling, and JavaScript for interactivity. Start with static sites, then learn frameworks like React or Vue.js for dynamic applications.",
    ),
    (
        "get a job in tech",
        "Build skills, projects, and network.",
        "To get a job in tech, develop relevant technical skills, build a portfolio of projects, network with professionals, contribute to open source, and prepare for technical interviews with practice.",
    ),
];

/// (left, right, short, expanded). Matches when the input names both sides,
/// e.g. "sql vs nosql" or "difference between sql and nosql".
pub(crate) const COMPARISONS: &[(&str, &str, &str, &str)] = &[
    (
        "react",
        "vue",
        "React is more popular, Vue is easier to learn.",
        "React has a larger ecosystem and community, while Vue is known for its gentle learning curve and excellent documentation. Both are excellent choices for building user interfaces.",
    ),
    (
        "python",
        "javascript",
        "Python for data/backend, JavaScript for web.",
        "Python excels in data science, machine learning, and backend development. JavaScript is primarily used for web development (frontend and backend with Node.js).",
    ),
    (
        "sql",
        "nosql",
        "SQL for structured data, NoSQL for flexibility.",
        "SQL databases are relational and good for structured data with complex queries. NoSQL databases are more flexible and better for unstructured data and scalability.",
    ),
];

pub(crate) const GREETING_SHORTS: &[&str] = &[
    "Hi there! 👋",
    "Hello! 👋",
    "Hey! Good to see you. 👋",
];

pub(crate) const GREETING_EXPANDED: &[&str] = &[
    "Hello! I'm your AI assistant, here to help with anything you need. Whether it's answering questions, solving problems, or just having a chat, feel free to ask!",
    "Hi! Ask me about technology, programming, general knowledge or a quick calculation and I'll do my best to help.",
];
