//! Catalogue shipped with the binary, used when no catalogue file is configured.

use super::{Artist, Catalogue, Song};

const TAYLOR_SWIFT: &[(&str, &str, u32)] = &[
    ("Fortnight", "The Tortured Poets Department", 228),
    ("The Tortured Poets Department", "The Tortured Poets Department", 293),
    ("My Boy Only Breaks His Favorite Toys", "The Tortured Poets Department", 203),
    ("Down Bad", "The Tortured Poets Department", 261),
    ("So Long, London", "The Tortured Poets Department", 262),
    ("But Daddy I Love Him", "The Tortured Poets Department", 335),
    ("Fresh Out The Slammer", "The Tortured Poets Department", 210),
    ("I Can Do It With a Broken Heart", "The Tortured Poets Department", 218),
    ("Anti-Hero", "Midnights", 200),
    ("Lavender Haze", "Midnights", 202),
    ("Maroon", "Midnights", 218),
    ("Snow On The Beach", "Midnights", 256),
    ("Midnight Rain", "Midnights", 174),
    ("Bejeweled", "Midnights", 194),
    ("Karma", "Midnights", 204),
    ("Vigilante Shit", "Midnights", 165),
    ("Willow", "Evermore", 214),
    ("Champagne Problems", "Evermore", 244),
    ("Gold Rush", "Evermore", 185),
    ("No Body, No Crime", "Evermore", 215),
    ("Tolerate It", "Evermore", 245),
    ("Ivy", "Evermore", 260),
    ("Cardigan", "Folklore", 239),
    ("August", "Folklore", 262),
    ("Betty", "Folklore", 294),
    ("The 1", "Folklore", 210),
    ("Exile", "Folklore", 285),
    ("Seven", "Folklore", 229),
    ("Invisible String", "Folklore", 252),
    ("Cruel Summer", "Lover", 178),
    ("Lover", "Lover", 221),
    ("The Man", "Lover", 190),
    ("Paper Rings", "Lover", 222),
    ("Cornelia Street", "Lover", 287),
    ("Death By A Thousand Cuts", "Lover", 198),
    ("Ready For It", "Reputation", 208),
    ("Delicate", "Reputation", 232),
    ("Look What You Made Me Do", "Reputation", 211),
    ("Getaway Car", "Reputation", 234),
    ("Dress", "Reputation", 231),
    ("Blank Space", "1989", 231),
    ("Shake It Off", "1989", 219),
    ("Style", "1989", 231),
    ("Bad Blood", "1989", 211),
    ("Wildest Dreams", "1989", 220),
    ("Out Of The Woods", "1989", 235),
    ("All Too Well", "Red", 329),
    ("We Are Never Getting Back Together", "Red", 193),
    ("I Knew You Were Trouble", "Red", 220),
    ("22", "Red", 232),
    ("Enchanted", "Speak Now", 352),
    ("Back To December", "Speak Now", 293),
    ("Mean", "Speak Now", 240),
    ("Love Story", "Fearless", 235),
    ("You Belong With Me", "Fearless", 231),
    ("Fifteen", "Fearless", 294),
];

const UTADA_HIKARU: &[(&str, &str, u32)] = &[
    ("First Love", "First Love", 249),
    ("Automatic", "First Love", 325),
    ("Hikari", "Deep River", 325),
    ("Simple And Clean", "Kingdom Hearts", 320),
    ("Flavor Of Life", "Heart Station", 301),
    ("Beautiful World", "Evangelion", 333),
    ("Passion", "Ultra Blue", 305),
    ("Sanctuary", "Kingdom Hearts II", 282),
    ("One Last Kiss", "Evangelion", 262),
    ("Face My Fears", "Kingdom Hearts III", 224),
    ("traveling", "Deep River", 324),
    ("Addicted To You", "First Love", 273),
    ("Can You Keep A Secret", "Distance", 285),
    ("Sakura Drops", "Deep River", 295),
    ("Prisoner Of Love", "Heart Station", 296),
    ("Be My Last", "Ultra Blue", 274),
    ("Colors", "Ultra Blue", 306),
    ("Goodbye Happiness", "Utada Hikaru Single Collection Vol.2", 268),
    ("Merry Christmas Mr. Lawrence", "Fantome", 276),
    ("Hatsukoi", "Hatsukoi", 266),
];

const SABRINA_CARPENTER: &[(&str, &str, u32)] = &[
    ("Espresso", "Short n' Sweet", 175),
    ("Please Please Please", "Short n' Sweet", 186),
    ("Taste", "Short n' Sweet", 157),
    ("Bed Chem", "Short n' Sweet", 178),
    ("Coincidence", "Short n' Sweet", 185),
    ("Slim Pickins", "Short n' Sweet", 173),
    ("Juno", "Short n' Sweet", 169),
    ("Sharpest Tool", "Short n' Sweet", 199),
    ("Dumb & Poetic", "Short n' Sweet", 182),
    ("Lie To Girls", "Short n' Sweet", 195),
    ("Don't Smile", "Short n' Sweet", 168),
    ("Good Graces", "Short n' Sweet", 188),
    ("Feather", "emails i can't send", 194),
    ("Nonsense", "emails i can't send", 172),
    ("because i liked a boy", "emails i can't send", 198),
    ("Read your Mind", "emails i can't send", 208),
    ("Vicious", "emails i can't send", 188),
    ("Already Over", "emails i can't send", 201),
    ("Fast Times", "emails i can't send", 183),
    ("How Many Things", "emails i can't send", 195),
    ("bet u wanna", "emails i can't send", 178),
    ("tornado warnings", "emails i can't send", 203),
    ("decode", "emails i can't send", 189),
    ("opposite", "emails i can't send", 186),
    ("Skin", "Singular Act II", 193),
    ("Looking at Me", "Singular Act II", 156),
    ("In My Bed", "Singular Act II", 188),
    ("Pushing 20", "Singular Act II", 194),
    ("Exhale", "Singular Act II", 203),
    ("Paris", "Singular Act II", 179),
];

pub fn catalogue() -> Catalogue {
    let artists = [
        ("taylor-swift", "Taylor Swift", TAYLOR_SWIFT),
        ("utada-hikaru", "Utada Hikaru", UTADA_HIKARU),
        ("sabrina-carpenter", "Sabrina Carpenter", SABRINA_CARPENTER),
    ];
    Catalogue {
        artists: artists
            .into_iter()
            .map(|(id, name, songs)| Artist {
                id: id.to_string(),
                name: name.to_string(),
                songs: songs
                    .iter()
                    .map(|&(title, album, duration_seconds)| Song {
                        title: title.to_string(),
                        album: album.to_string(),
                        duration_seconds,
                    })
                    .collect(),
            })
            .collect(),
    }
}
